use leptos::prelude::*;

#[derive(Clone, Debug, Default)]
pub struct MaterialsListState {
    // purchase years offered by the server, `TUTTO` last
    pub partitions: Vec<String>,
    pub is_filter_expanded: bool,
}

pub fn create_state() -> RwSignal<MaterialsListState> {
    RwSignal::new(MaterialsListState {
        is_filter_expanded: true,
        ..Default::default()
    })
}
