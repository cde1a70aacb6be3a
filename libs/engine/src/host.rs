use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;

use events_api::StoreIdentity;

use crate::error::HostResolutionError;

pub type ResolveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<StoreIdentity, HostResolutionError>> + Send + 'a>>;

/// Определяет, от имени какого «магазина» генерируются события.
pub trait HostResolver: Send + Sync {
    fn resolve(&self) -> ResolveFuture<'_>;
}

// ════════════════════════════════════════════════════════════════
//  SystemHostResolver
// ════════════════════════════════════════════════════════════════

/// Имя хоста из ОС, IP через системный resolver (IPv4 предпочтительнее).
/// FQDN берётся обратным lookup'ом выбранного IP; если он не дал имени
/// с доменом, остаётся имя хоста.
pub struct SystemHostResolver;

impl HostResolver for SystemHostResolver {
    fn resolve(&self) -> ResolveFuture<'_> {
        Box::pin(async {
            let name = hostname::get()
                .map_err(|e| HostResolutionError(format!("hostname: {e}")))?
                .to_string_lossy()
                .into_owned();

            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((name.as_str(), 0))
                .await
                .map_err(|e| HostResolutionError(format!("lookup {name}: {e}")))?
                .collect();

            let ip = pick_ip(&addrs)
                .ok_or_else(|| HostResolutionError(format!("no address for {name}")))?;

            let reverse = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip))
                .await
                .map_err(|e| HostResolutionError(format!("reverse lookup task: {e}")))?;
            let fqdn = match reverse {
                Ok(candidate) => pick_fqdn(name, candidate),
                Err(e) => {
                    tracing::debug!(ip = %ip, error = %e, "reverse lookup failed, using hostname");
                    name
                }
            };

            Ok(StoreIdentity { fqdn, ip: ip.to_string() })
        })
    }
}

/// Имя с доменом из обратного lookup'а, иначе исходное имя хоста.
fn pick_fqdn(hostname: String, reverse: String) -> String {
    let is_domain = reverse.contains('.')
        && reverse.parse::<IpAddr>().is_err()
        && !reverse.ends_with(".in-addr.arpa")
        && !reverse.ends_with(".ip6.arpa");
    if is_domain {
        reverse
    } else {
        hostname
    }
}

fn pick_ip(addrs: &[SocketAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .map(|a| a.ip())
}

// ════════════════════════════════════════════════════════════════
//  StaticHostResolver
// ════════════════════════════════════════════════════════════════

/// Заранее заданная identity (конфиг или тесты).
pub struct StaticHostResolver {
    identity: StoreIdentity,
}

impl StaticHostResolver {
    pub fn new(fqdn: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            identity: StoreIdentity { fqdn: fqdn.into(), ip: ip.into() },
        }
    }
}

impl HostResolver for StaticHostResolver {
    fn resolve(&self) -> ResolveFuture<'_> {
        let identity = self.identity.clone();
        Box::pin(async move { Ok(identity) })
    }
}
