//! MX lookups for the `email:checkdns` validator.

use std::fmt::Debug;

/// Answers whether a mail domain publishes MX records.
///
/// The lookup is blocking. Callers that need timeouts or retries wrap their
/// resolver accordingly.
pub trait MxResolver: Debug + Send + Sync {
    /// Whether `domain` has at least one MX record.
    fn has_mx(&self, domain: &str) -> bool;
}

/// Resolver used when no DNS backend is available.
///
/// Every lookup fails, so `email:checkdns` rejects all addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDns;

impl MxResolver for NoDns {
    fn has_mx(&self, domain: &str) -> bool {
        tracing::warn!(domain, "MX lookup requested but no DNS resolver is configured");
        false
    }
}

/// Resolver backed by the system DNS configuration.
#[cfg(feature = "dns")]
pub struct SystemDns {
    resolver: hickory_resolver::Resolver,
}

#[cfg(feature = "dns")]
impl Debug for SystemDns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemDns").finish_non_exhaustive()
    }
}

#[cfg(feature = "dns")]
impl SystemDns {
    /// Build a resolver from the system configuration.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            resolver: hickory_resolver::Resolver::from_system_conf()?,
        })
    }
}

#[cfg(feature = "dns")]
impl MxResolver for SystemDns {
    fn has_mx(&self, domain: &str) -> bool {
        match self.resolver.mx_lookup(domain) {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(error) => {
                tracing::debug!(domain, %error, "MX lookup failed");
                false
            }
        }
    }
}

/// The resolver a new schema starts with.
///
/// Built once per process and shared by every schema.
#[cfg(feature = "dns")]
pub(crate) fn default_resolver() -> std::sync::Arc<dyn MxResolver> {
    static SHARED: std::sync::OnceLock<std::sync::Arc<dyn MxResolver>> =
        std::sync::OnceLock::new();

    SHARED
        .get_or_init(|| match SystemDns::new() {
            Ok(dns) => std::sync::Arc::new(dns) as std::sync::Arc<dyn MxResolver>,
            Err(error) => {
                tracing::warn!(%error, "falling back to NoDns");
                std::sync::Arc::new(NoDns)
            }
        })
        .clone()
}

/// The resolver a new schema starts with.
#[cfg(not(feature = "dns"))]
pub(crate) fn default_resolver() -> std::sync::Arc<dyn MxResolver> {
    std::sync::Arc::new(NoDns)
}
