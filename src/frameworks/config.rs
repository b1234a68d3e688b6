use std::{env, net::IpAddr};

// Runtime/server constants (not game policy).

pub fn http_host() -> IpAddr {
    env::var("CLICKER_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

pub fn http_port() -> u16 {
    env::var("CLICKER_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000)
}

pub const OUTBOUND_CHANNEL_CAPACITY: usize = 64;
