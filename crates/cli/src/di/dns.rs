use ferrous_relay_application::ports::ExchangeObserver;
use ferrous_relay_application::services::RandomUpstreamSelector;
use ferrous_relay_application::use_cases::{ExchangeEngine, HandleDnsQueryUseCase};
use ferrous_relay_domain::{Config, DomainRouter, RoutingTable};
use ferrous_relay_infrastructure::dns::{
    CompositeObserver, DnsServerHandler, ExchangeMetrics, NetworkTransport, SystemAddressResolver,
    TracingObserver,
};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: Arc<DnsServerHandler>,
    pub metrics: ExchangeMetrics,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let table = config.routing_table()?;
        Self::log_routing_table(&table);

        let metrics = ExchangeMetrics::new();
        let observer: Arc<dyn ExchangeObserver> = Arc::new(
            CompositeObserver::new()
                .with(Arc::new(TracingObserver::new()))
                .with(Arc::new(metrics.clone())),
        );

        let timeout = config.server.query_timeout();
        let engine = Arc::new(ExchangeEngine::new(
            Arc::new(NetworkTransport::new()),
            observer.clone(),
            timeout,
        ));

        let use_case = Arc::new(HandleDnsQueryUseCase::new(
            Arc::new(DomainRouter::new(table)),
            Arc::new(RandomUpstreamSelector::new()),
            Arc::new(SystemAddressResolver::new(timeout)),
            engine,
            observer.clone(),
        ));

        info!(
            query_timeout_ms = config.server.query_timeout_ms,
            "DNS services initialized"
        );

        Ok(Self {
            handler: Arc::new(DnsServerHandler::new(use_case, observer)),
            metrics,
        })
    }

    fn log_routing_table(table: &RoutingTable) {
        for rule in table.rules() {
            let addresses: Vec<String> = rule.addresses().iter().map(|a| a.to_string()).collect();
            info!(
                pattern = rule.pattern(),
                addresses = %addresses.join(", "),
                protocol = %rule.protocol(),
                "Routing rule loaded"
            );
        }
        if !table.has_catch_all() {
            info!("No catch-all rule; unmatched queries will be dropped");
        }
    }
}
