use std::{
    io,
    net::{SocketAddr, UdpSocket},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;

use crate::telemetry::TelemetrySink;

pub struct UdpSender {
    socket: UdpSocket,
}

impl UdpSender {
    pub fn new(src_port: u16, dst_address: &str) -> io::Result<UdpSender> {
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], src_port)))?;
        // Block until hostname lookup succeeds
        while let Err(err) = socket.connect(dst_address) {
            warn!("Waiting for {}: {}", dst_address, err);
            thread::sleep(Duration::from_secs(3));
        }
        socket.set_nonblocking(true)?;
        Ok(UdpSender { socket })
    }

    pub fn send(&self, msg: impl Serialize) -> Result<usize> {
        let buf = rmp_serde::to_vec(&msg).context("Failed to encode telemetry message")?;
        Ok(self.socket.send(&buf)?)
    }
}

impl TelemetrySink for UdpSender {
    fn put_number(&mut self, key: &str, value: f64) -> Result<()> {
        match self.send((key, value)) {
            Ok(_) => Ok(()),
            // Nobody listening yet; the next frame will try again.
            Err(err) if is_transient(&err) => {
                warn!("Dropped telemetry {}: {}", key, err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

fn is_transient(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>().map_or(false, |err| {
        matches!(
            err.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::ConnectionRefused
        )
    })
}
