use leptos::prelude::*;

#[derive(Clone, Debug, Default)]
pub struct ServiceOrdersListState {
    // months offered by the server, `TUTTO` last
    pub partitions: Vec<String>,
    // RTC dropdown choices for the current partition and filters
    pub technicians: Vec<String>,
    pub technician: String,
}

pub fn create_state() -> RwSignal<ServiceOrdersListState> {
    RwSignal::new(ServiceOrdersListState::default())
}
