use super::exchange::{ExchangeEngine, ExchangeResult};
use crate::ports::{AddressResolver, ExchangeEvent, ExchangeObserver, UpstreamSelector};
use ferrous_relay_domain::{DnsQuery, DomainError, DomainRouter, Transport, UpstreamTarget};
use std::sync::Arc;

/// Routes a query to its upstream pool and runs the exchange.
///
/// `Err(DomainError::NoMatchingRule)` means the query must be dropped; every
/// other error is answered with SERVFAIL by the caller.
pub struct HandleDnsQueryUseCase {
    router: Arc<DomainRouter>,
    selector: Arc<dyn UpstreamSelector>,
    resolver: Arc<dyn AddressResolver>,
    engine: Arc<ExchangeEngine>,
    observer: Arc<dyn ExchangeObserver>,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        router: Arc<DomainRouter>,
        selector: Arc<dyn UpstreamSelector>,
        resolver: Arc<dyn AddressResolver>,
        engine: Arc<ExchangeEngine>,
        observer: Arc<dyn ExchangeObserver>,
    ) -> Self {
        Self {
            router,
            selector,
            resolver,
            engine,
            observer,
        }
    }

    pub async fn execute(
        &self,
        query: &DnsQuery,
        client_transport: Transport,
    ) -> Result<ExchangeResult, DomainError> {
        let Some(rule) = self.router.dispatch(query.name()) else {
            let reason = DomainError::NoMatchingRule(query.name().to_string());
            self.observer.on_event(&ExchangeEvent::Dropped {
                query,
                reason: &reason,
            });
            return Err(reason);
        };

        let upstream = self.selector.select(rule.addresses()).ok_or_else(|| {
            DomainError::NoUpstreamSelected {
                pattern: rule.pattern().to_string(),
            }
        })?;

        self.observer.on_event(&ExchangeEvent::UpstreamChosen {
            query,
            pattern: rule.pattern(),
            upstream,
        });

        let transport = rule.protocol().initial_transport(client_transport);

        let addr = match self.resolver.resolve(upstream).await {
            Ok(addr) => addr,
            Err(e) => {
                self.observer.on_event(&ExchangeEvent::NetworkError {
                    query,
                    upstream: upstream.to_string(),
                    transport,
                    error: &e,
                });
                return Err(e);
            }
        };

        self.engine
            .exchange(query, UpstreamTarget::new(addr, transport))
            .await
    }
}
