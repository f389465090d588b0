//! Orchestrates lookups: input validation, the provider call with a timeout, the
//! state transition and the recent-city update that follows a success.
//!
//! `submit` runs one lookup start to finish. Callers that keep several lookups in
//! flight use `begin`, fetch through a [`Dispatcher`] (which does not borrow the
//! controller), then hand each outcome to `complete`; only the newest ticket's
//! outcome is applied.

use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, DEFAULT_REQUEST_TIMEOUT},
    error::ProviderError,
    model::{UnitSystem, WeatherPayload, WeatherRequest, WeatherSnapshot},
    provider::{WeatherProvider, provider_from_config},
    query::{Command, QueryMachine, QueryState, QueryView, Resolution, Ticket},
    recent::RecentCities,
    store::PersistenceStore,
};

/// Cheap handle for calling the provider outside of a controller borrow.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    provider: Arc<dyn WeatherProvider>,
    timeout: Duration,
}

impl Dispatcher {
    pub async fn fetch(&self, request: &WeatherRequest) -> Result<WeatherPayload, ProviderError> {
        if request.city.is_empty() {
            return Err(ProviderError::EmptyCity);
        }

        match tokio::time::timeout(self.timeout, self.provider.current_weather(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }
}

#[derive(Debug)]
pub struct QueryController {
    dispatcher: Dispatcher,
    machine: QueryMachine,
    recent: RecentCities,
    units: UnitSystem,
}

impl QueryController {
    /// Loads the recent-city list from `store` right away.
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn PersistenceStore>) -> Self {
        Self {
            dispatcher: Dispatcher { provider, timeout: DEFAULT_REQUEST_TIMEOUT },
            machine: QueryMachine::new(),
            recent: RecentCities::initialize(store),
            units: UnitSystem::default(),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn PersistenceStore>) -> anyhow::Result<Self> {
        let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);

        Ok(Self::new(provider, store)
            .with_units(config.units)
            .with_timeout(config.request_timeout()))
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher.timeout = timeout;
        self
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Looks up `city` with the current unit preference.
    pub async fn submit(&mut self, city: &str) -> Resolution {
        self.submit_with_units(city, self.units).await
    }

    pub async fn submit_with_units(&mut self, city: &str, units: UnitSystem) -> Resolution {
        let ticket = self.begin(city, units);
        let outcome = self.dispatcher.fetch(&ticket.request).await;
        self.complete(&ticket, outcome)
    }

    /// Issues a ticket and moves to `Loading`. The city name is trimmed.
    pub fn begin(&mut self, city: &str, units: UnitSystem) -> Ticket {
        let ticket = self.machine.begin(city.trim(), units);
        tracing::info!(
            request_id = ticket.request_id,
            city = %ticket.request.city,
            %units,
            "weather lookup issued"
        );
        ticket
    }

    /// Applies the outcome of `ticket`, then runs the commands a success produced.
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        outcome: Result<WeatherPayload, ProviderError>,
    ) -> Resolution {
        let resolution = self.machine.resolve(ticket, outcome);

        if let Resolution::Success(commands) = &resolution {
            for command in commands {
                self.execute(command);
            }
        }

        resolution
    }

    fn execute(&mut self, command: &Command) {
        match command {
            Command::RecordRecent(city) => self.recent.record(city),
        }
    }

    pub fn state(&self) -> &QueryState {
        self.machine.state()
    }

    pub fn view(&self) -> QueryView {
        self.machine.state().view()
    }

    /// The displayed snapshot, by value, for a details screen.
    pub fn details(&self) -> Option<WeatherSnapshot> {
        self.machine.state().snapshot().cloned()
    }

    pub fn recent(&self) -> &[String] {
        self.recent.current()
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Affects the next submission only; nothing is refetched.
    pub fn toggle_units(&mut self) -> UnitSystem {
        self.units = self.units.toggle();
        self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        recent::RECENT_CITIES_KEY,
        store::MemoryStore,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        requests: Mutex<Vec<WeatherRequest>>,
    }

    impl ScriptedProvider {
        fn requests(&self) -> Vec<WeatherRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current_weather(
            &self,
            request: &WeatherRequest,
        ) -> Result<WeatherPayload, ProviderError> {
            self.requests.lock().push(request.clone());

            match request.city.as_str() {
                "Paris" => Ok(payload("Paris", 18.3)),
                "Rome" => Ok(payload("Rome", 24.0)),
                "Oslo" => Ok(payload("Oslo", -2.0)),
                _ => Err(ProviderError::Status { status: 404, body: "city not found".into() }),
            }
        }
    }

    #[derive(Debug)]
    struct StalledProvider;

    #[async_trait]
    impl WeatherProvider for StalledProvider {
        async fn current_weather(
            &self,
            _request: &WeatherRequest,
        ) -> Result<WeatherPayload, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(payload("Nowhere", 0.0))
        }
    }

    fn payload(name: &str, temperature: f64) -> WeatherPayload {
        WeatherPayload {
            name: name.into(),
            temperature,
            humidity: 60.0,
            description: "clear sky".into(),
            icon: "01d".into(),
            wind_speed: 3.2,
            observed_at: None,
        }
    }

    fn controller() -> (Arc<ScriptedProvider>, Arc<MemoryStore>, QueryController) {
        let provider = Arc::new(ScriptedProvider::default());
        let store = Arc::new(MemoryStore::new());
        let ctl = QueryController::new(provider.clone(), store.clone());
        (provider, store, ctl)
    }

    #[tokio::test]
    async fn paris_lookup_succeeds_and_is_recorded() {
        let (_, store, mut ctl) = controller();

        let resolution = ctl.submit("Paris").await;

        assert!(matches!(resolution, Resolution::Success(_)));
        let expected = WeatherSnapshot {
            city_label: "Paris".into(),
            temperature: 18.3,
            unit_system: UnitSystem::Metric,
            description: "clear sky".into(),
            icon_code: "01d".into(),
            humidity_percent: 60,
            wind_speed: 3.2,
            observed_at: None,
        };
        assert_eq!(ctl.state(), &QueryState::Success { snapshot: expected.clone() });
        assert_eq!(ctl.details(), Some(expected));
        assert_eq!(ctl.recent(), ["Paris"]);
        assert_eq!(store.load(RECENT_CITIES_KEY).unwrap(), Some(br#"["Paris"]"#.to_vec()));
    }

    #[tokio::test]
    async fn not_found_leaves_recent_list_unchanged() {
        let (_, _, mut ctl) = controller();
        ctl.submit("Paris").await;

        let resolution = ctl.submit("Atlantis").await;

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(ctl.state(), &QueryState::Error { message: "City not found".into() });
        assert_eq!(ctl.details(), None);
        assert_eq!(ctl.recent(), ["Paris"]);
    }

    #[test]
    fn begin_is_observable_before_any_await() {
        let (_, _, mut ctl) = controller();

        let ticket = ctl.begin("Paris", UnitSystem::Metric);

        assert_eq!(ctl.state(), &QueryState::Loading { request_id: ticket.request_id });
        assert!(ctl.view().loading);
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let (_, _, mut ctl) = controller();
        let dispatcher = ctl.dispatcher();

        let first = ctl.begin("Paris", UnitSystem::Metric);
        let second = ctl.begin("Rome", UnitSystem::Metric);

        let (first_out, second_out) =
            tokio::join!(dispatcher.fetch(&first.request), dispatcher.fetch(&second.request));

        // newer response lands first, older one straggles in afterwards
        assert!(matches!(ctl.complete(&second, second_out), Resolution::Success(_)));
        assert_eq!(ctl.complete(&first, first_out), Resolution::Stale);

        assert_eq!(ctl.details().map(|s| s.city_label), Some("Rome".to_string()));
        assert_eq!(ctl.recent(), ["Rome"]);
    }

    #[tokio::test]
    async fn stale_response_before_current_one_keeps_loading() {
        let (_, _, mut ctl) = controller();
        let dispatcher = ctl.dispatcher();

        let first = ctl.begin("Paris", UnitSystem::Metric);
        let second = ctl.begin("Atlantis", UnitSystem::Metric);

        let out = dispatcher.fetch(&first.request).await;
        assert_eq!(ctl.complete(&first, out), Resolution::Stale);
        assert_eq!(ctl.state(), &QueryState::Loading { request_id: second.request_id });
        assert!(ctl.recent().is_empty());

        let out = dispatcher.fetch(&second.request).await;
        assert_eq!(ctl.complete(&second, out), Resolution::Failed);
        assert!(ctl.recent().is_empty());
    }

    #[tokio::test]
    async fn snapshot_uses_units_from_submission_time() {
        let (provider, _, mut ctl) = controller();
        let dispatcher = ctl.dispatcher();

        let ticket = ctl.begin("Paris", ctl.units());
        ctl.toggle_units();
        let out = dispatcher.fetch(&ticket.request).await;
        ctl.complete(&ticket, out);

        assert_eq!(ctl.units(), UnitSystem::Imperial);
        assert_eq!(ctl.details().map(|s| s.unit_system), Some(UnitSystem::Metric));
        assert_eq!(provider.requests()[0].units, UnitSystem::Metric);
    }

    #[tokio::test]
    async fn toggling_units_does_not_refetch() {
        let (provider, _, mut ctl) = controller();
        ctl.submit("Paris").await;
        let before = ctl.details();

        ctl.toggle_units();

        assert_eq!(provider.requests().len(), 1);
        assert_eq!(ctl.details(), before);

        ctl.submit("Paris").await;
        assert_eq!(provider.requests()[1].units, UnitSystem::Imperial);
        assert_eq!(ctl.details().map(|s| s.unit_system), Some(UnitSystem::Imperial));
    }

    #[tokio::test]
    async fn blank_city_is_rejected_without_calling_provider() {
        let (provider, _, mut ctl) = controller();

        let resolution = ctl.submit("   ").await;

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(ctl.state().error(), Some("City not found"));
        assert!(provider.requests().is_empty());
        assert!(ctl.recent().is_empty());
    }

    #[tokio::test]
    async fn city_name_is_trimmed_before_lookup_and_record() {
        let (provider, _, mut ctl) = controller();

        ctl.submit("  Oslo ").await;

        assert_eq!(provider.requests()[0].city, "Oslo");
        assert_eq!(ctl.recent(), ["Oslo"]);
    }

    #[tokio::test]
    async fn repeated_city_moves_to_front() {
        let (_, _, mut ctl) = controller();
        for city in ["Paris", "Rome", "Oslo", "Rome"] {
            ctl.submit(city).await;
        }

        assert_eq!(ctl.recent(), ["Rome", "Oslo", "Paris"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out_as_not_found() {
        let store = Arc::new(MemoryStore::new());
        let mut ctl = QueryController::new(Arc::new(StalledProvider), store)
            .with_timeout(Duration::from_secs(5));

        let resolution = ctl.submit("Paris").await;

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(ctl.state().error(), Some("City not found"));
        assert!(ctl.recent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_reports_timeout_kind() {
        let store = Arc::new(MemoryStore::new());
        let ctl = QueryController::new(Arc::new(StalledProvider), store)
            .with_timeout(Duration::from_secs(5));
        let request = WeatherRequest { city: "Paris".into(), units: UnitSystem::Metric };

        let err = ctl.dispatcher().fetch(&request).await.unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn recent_list_survives_a_new_controller() {
        let (provider, store, mut ctl) = controller();
        ctl.submit("Paris").await;
        ctl.submit("Rome").await;

        let reopened = QueryController::new(provider, store);

        assert_eq!(reopened.recent(), ["Rome", "Paris"]);
        assert_eq!(reopened.state(), &QueryState::Idle);
    }
}
