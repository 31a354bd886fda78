//! Local interface enumeration.

use std::net::IpAddr;

/// One address on one local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub addr: IpAddr,
}

/// Addresses of the local network interfaces, v4 and v6.
///
/// Returns an empty list when enumeration fails; the diagnostic endpoint
/// has no failure mode worth surfacing.
#[cfg(unix)]
pub fn local_addresses() -> Vec<InterfaceAddr> {
    use std::ffi::CStr;

    let mut out = Vec::new();

    // getifaddrs allocates a linked list that must be walked and freed.
    let mut ifap: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut ifap) } != 0 {
        tracing::debug!("getifaddrs failed");
        return out;
    }

    let mut cursor = ifap;
    while !cursor.is_null() {
        let ifa = unsafe { &*cursor };
        cursor = ifa.ifa_next;

        if ifa.ifa_addr.is_null() {
            continue;
        }

        let family = unsafe { (*ifa.ifa_addr).sa_family };
        let addr = match i32::from(family) {
            libc::AF_INET => {
                let sin = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in) };
                // s_addr keeps network byte order in memory
                Some(IpAddr::from(sin.sin_addr.s_addr.to_ne_bytes()))
            }
            libc::AF_INET6 => {
                let sin6 = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in6) };
                Some(IpAddr::from(sin6.sin6_addr.s6_addr))
            }
            _ => None,
        };

        if let Some(addr) = addr {
            let name = unsafe { CStr::from_ptr(ifa.ifa_name) }
                .to_string_lossy()
                .into_owned();
            out.push(InterfaceAddr { name, addr });
        }
    }

    unsafe { libc::freeifaddrs(ifap) };
    out
}

#[cfg(not(unix))]
pub fn local_addresses() -> Vec<InterfaceAddr> {
    Vec::new()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_is_listed() {
        let addrs = local_addresses();
        if addrs.is_empty() {
            // Environments without netlink access report nothing
            return;
        }
        assert!(addrs.iter().any(|iface| iface.addr.is_loopback()));
    }
}
