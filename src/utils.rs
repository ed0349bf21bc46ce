/// Utility functions for time formatting and device discovery
use std::net::{IpAddr, UdpSocket};
use time::{macros::format_description, OffsetDateTime};

/// Current wall-clock time, in the local offset when it can be determined
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Format a timestamp for the 16 column display
///
/// Converts an OffsetDateTime to DD.MM.YY HH:MM format.
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year repr:last_two] [hour]:[minute]");
    dt.format(format).unwrap_or_else(|_| dt.to_string())
}

/// Discover the address this device is reachable at on the local network
///
/// Connecting a UDP socket sends nothing; it only asks the kernel which
/// interface would route to the given peer.
pub fn local_ip_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("192.0.2.1:80").ok()?;
    socket
        .local_addr()
        .ok()
        .map(|addr| addr.ip())
        .filter(|ip| !ip.is_unspecified())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_day_first_with_short_year() {
        let dt = datetime!(2024-03-07 09:05:59 UTC);
        assert_eq!(format_datetime(&dt), "07.03.24 09:05");
    }
}
