use std::cell::RefCell;
use std::collections::HashSet;

use contracts::shared::grid::{ColumnFilter, ExportFormat, PageLength, RowId};
use serde_json::Value;

use super::debounce::Debouncer;
use super::error::GridError;
use super::model::{EditOutcome, EditStart, FetchOutcome, FetchStart, GridModel, GridSnapshot};
use super::transport::{GridTimer, GridTransport};

pub const DEFAULT_DEBOUNCE_MS: u32 = 350;

type Listener = Box<dyn Fn(GridSnapshot)>;

/// One grid on one mounted page.
///
/// All operations take `&self`; the model sits in a `RefCell` that is only
/// borrowed between awaits, so several operations may interleave on the
/// single-threaded UI executor.
pub struct GridController<T, C> {
    model: RefCell<GridModel>,
    transport: T,
    timer: C,
    debouncer: Debouncer,
    debounce_ms: u32,
    listener: RefCell<Option<Listener>>,
}

impl<T: GridTransport, C: GridTimer> GridController<T, C> {
    pub fn new(transport: T, timer: C, model: GridModel) -> Self {
        Self {
            model: RefCell::new(model),
            transport,
            timer,
            debouncer: Debouncer::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            listener: RefCell::new(None),
        }
    }

    pub fn with_debounce(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Called with a fresh snapshot after every state change.
    pub fn set_listener(&self, listener: impl Fn(GridSnapshot) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
        self.notify();
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.model.borrow().snapshot()
    }

    fn notify(&self) {
        let snapshot = self.model.borrow().snapshot();
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(snapshot);
        }
    }

    fn report(&self, error: &GridError) {
        log::warn!("grid: {}", error);
        self.model.borrow_mut().report(error);
        self.notify();
    }

    pub async fn load_columns(&self) -> Result<(), GridError> {
        let result = self
            .transport
            .load_columns()
            .await
            .and_then(|columns| self.model.borrow_mut().apply_columns(columns));
        match &result {
            Ok(()) => self.notify(),
            Err(e) => self.report(e),
        }
        result
    }

    /// Values for the partition selector; empty after a failure.
    pub async fn partitions(&self) -> Vec<String> {
        match self.transport.partitions().await {
            Ok(values) => values,
            Err(e) => {
                self.report(&e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_page(&self) -> FetchOutcome {
        let start = self.model.borrow_mut().begin_fetch();
        self.notify();

        let (seq, request) = match start {
            FetchStart::Skipped => return FetchOutcome::Skipped,
            FetchStart::Issued { seq, request } => (seq, request),
        };
        log::debug!(
            "grid fetch #{}: partition={} start={} filters={}",
            seq,
            request.filters.partition,
            request.page.start,
            request.filters.column_filters.len()
        );

        let result = self.transport.fetch_page(&request).await;
        let outcome = self.model.borrow_mut().complete_fetch(seq, result);
        match &outcome {
            FetchOutcome::Stale => log::debug!("grid fetch #{} discarded", seq),
            FetchOutcome::Failed(e) => log::warn!("grid fetch #{} failed: {}", seq, e),
            _ => {}
        }
        if outcome != FetchOutcome::Stale {
            self.notify();
        }
        outcome
    }

    async fn debounced_fetch(&self) -> FetchOutcome {
        let generation = self.debouncer.arm();
        self.timer.sleep(self.debounce_ms).await;
        if !self.debouncer.is_current(generation) {
            return FetchOutcome::Superseded;
        }
        self.fetch_page().await
    }

    async fn fetch_now(&self) -> FetchOutcome {
        self.debouncer.cancel();
        self.fetch_page().await
    }

    /// Substring filter typed in a header or filter box.
    pub async fn apply_filter(&self, field: &str, value: &str) -> FetchOutcome {
        let changed = self
            .model
            .borrow_mut()
            .set_column_filter(field, ColumnFilter::contains(value));
        if !changed {
            return FetchOutcome::Unchanged;
        }
        self.notify();
        self.debounced_fetch().await
    }

    /// Equality filter picked from a dropdown; fetches right away.
    pub async fn apply_exact_filter(&self, field: &str, value: &str) -> FetchOutcome {
        let changed = self
            .model
            .borrow_mut()
            .set_column_filter(field, ColumnFilter::exact(value));
        if !changed {
            return FetchOutcome::Unchanged;
        }
        self.fetch_now().await
    }

    pub async fn set_global_search(&self, text: &str) -> FetchOutcome {
        if !self.model.borrow_mut().set_global_search(text) {
            return FetchOutcome::Unchanged;
        }
        self.notify();
        self.debounced_fetch().await
    }

    /// Enter in the search box: no waiting.
    pub async fn submit_global_search(&self, text: &str) -> FetchOutcome {
        self.model.borrow_mut().set_global_search(text);
        self.fetch_now().await
    }

    pub async fn set_partition(&self, partition: &str) -> FetchOutcome {
        if !self.model.borrow_mut().set_partition(partition) {
            return FetchOutcome::Unchanged;
        }
        self.fetch_now().await
    }

    pub async fn go_to_page(&self, page_index: u64) -> FetchOutcome {
        if !self.model.borrow_mut().go_to_page(page_index) {
            return FetchOutcome::Unchanged;
        }
        self.fetch_now().await
    }

    pub async fn set_page_length(&self, length: PageLength) -> FetchOutcome {
        if !self.model.borrow_mut().set_page_length(length) {
            return FetchOutcome::Unchanged;
        }
        self.fetch_now().await
    }

    pub async fn toggle_sort(&self, field: &str) -> FetchOutcome {
        if !self.model.borrow_mut().toggle_sort(field) {
            return FetchOutcome::Unchanged;
        }
        self.fetch_now().await
    }

    pub async fn refresh(&self) -> FetchOutcome {
        self.fetch_now().await
    }

    /// Optimistic single-cell update. `Err` means the edit was refused
    /// locally and nothing was sent.
    pub async fn edit_cell(
        &self,
        row_id: RowId,
        field: &str,
        value: Value,
    ) -> Result<EditOutcome, GridError> {
        let start = self.model.borrow_mut().begin_edit(&row_id, field, value);
        let request = match start {
            Ok(EditStart::Unchanged) => return Ok(EditOutcome::Unchanged),
            Ok(EditStart::Issued(request)) => request,
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };
        self.notify();

        let result = self.transport.update_cell(&request).await;
        let outcome = self
            .model
            .borrow_mut()
            .complete_edit(&row_id, field, result);
        if let EditOutcome::RolledBack(e) = &outcome {
            log::warn!("update of {} {} rolled back: {}", row_id, field, e);
        }
        self.notify();
        Ok(outcome)
    }

    /// Client-only; never talks to the server.
    pub fn toggle_column_visibility(&self, field: &str, visible: bool) -> bool {
        let changed = self.model.borrow_mut().set_column_visible(field, visible);
        if changed {
            self.notify();
        }
        changed
    }

    pub fn export_url(&self, format: ExportFormat) -> Result<String, GridError> {
        let query = self.model.borrow().export_query(format);
        let result = query.and_then(|query| self.transport.export_url(&query));
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    /// Choices for a filter-assist dropdown, in server order without
    /// duplicates. Empty without a partition.
    pub async fn unique_values(&self, column: &str) -> Vec<String> {
        let request = match self.model.borrow().unique_values_request(column) {
            Some(request) => request,
            None => return Vec::new(),
        };
        match self.transport.unique_values(&request).await {
            Ok(values) => {
                let mut seen = HashSet::new();
                values
                    .into_iter()
                    .filter(|value| seen.insert(value.clone()))
                    .collect()
            }
            Err(e) => {
                self.report(&e);
                Vec::new()
            }
        }
    }

    pub fn set_edit_mode(&self, on: bool) {
        self.model.borrow_mut().set_edit_mode(on);
        self.notify();
    }

    pub fn dismiss_notice(&self) {
        self.model.borrow_mut().dismiss_notice();
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::grid::model::GridPhase;
    use async_trait::async_trait;
    use contracts::shared::grid::{
        ColumnDescriptor, DataRequest, ExportQuery, GridRow, PageResult, UniqueValuesRequest,
        UpdateCellRequest, UpdateCellResponse,
    };
    use futures::channel::oneshot;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    const TECHNICIANS: [&str; 3] = ["ROSSI", "BIANCHI", "VERDI"];

    type PageReply = Result<PageResult, GridError>;

    #[derive(Default)]
    struct FakeServer {
        calls: RefCell<Vec<&'static str>>,
        data_requests: RefCell<Vec<DataRequest>>,
        unique_requests: RefCell<Vec<UniqueValuesRequest>>,
        update_requests: RefCell<Vec<UpdateCellRequest>>,
        park_pages: Cell<bool>,
        parked: RefCell<Vec<(u64, oneshot::Sender<PageReply>)>>,
        fail_columns: Cell<bool>,
        update_reply: RefCell<Option<Result<UpdateCellResponse, GridError>>>,
        unique_reply: RefCell<Vec<String>>,
    }

    impl FakeServer {
        fn data_calls(&self) -> usize {
            self.calls.borrow().iter().filter(|c| **c == "data").count()
        }

        fn release(&self, draw: u64, reply: PageReply) {
            let mut parked = self.parked.borrow_mut();
            let idx = parked
                .iter()
                .position(|(d, _)| *d == draw)
                .expect("no parked request with this draw");
            let (_, tx) = parked.remove(idx);
            let _ = tx.send(reply);
        }
    }

    fn order_row(id: u64) -> GridRow {
        let descrizione = if id % 40 == 0 {
            "pump unit replacement"
        } else {
            "valve check"
        };
        match json!({
            "ID": id,
            "MesePresentazione": "MAGGIO",
            "RTC": TECHNICIANS[(id % 3) as usize],
            "Stato": "APERTO",
            "descrizione": descrizione,
            "Note": "",
        }) {
            Value::Object(map) => GridRow(map),
            _ => unreachable!(),
        }
    }

    /// 120 service orders, filtered and paged the way the server does.
    fn serve_page(request: &DataRequest) -> PageResult {
        let all: Vec<GridRow> = (1..=120).map(order_row).collect();
        let filtered: Vec<GridRow> = all
            .iter()
            .filter(|row| {
                request.filters.column_filters.iter().all(|(field, filter)| {
                    let text = row.text(field).to_lowercase();
                    let wanted = filter.value.to_lowercase();
                    if filter.exact {
                        text == wanted
                    } else {
                        wanted.split_whitespace().all(|w| text.contains(w))
                    }
                })
            })
            .cloned()
            .collect();
        let start = request.page.start as usize;
        let data: Vec<GridRow> = match request.page.length {
            PageLength::All => filtered.clone(),
            PageLength::Rows(n) => filtered.iter().skip(start).take(n as usize).cloned().collect(),
        };
        PageResult {
            draw: request.draw,
            records_total: all.len() as u64,
            records_filtered: filtered.len() as u64,
            data,
            error: None,
        }
    }

    struct FakeTransport(Rc<FakeServer>);

    #[async_trait(?Send)]
    impl GridTransport for FakeTransport {
        async fn load_columns(&self) -> Result<Vec<ColumnDescriptor>, GridError> {
            self.0.calls.borrow_mut().push("columns");
            if self.0.fail_columns.get() {
                return Err(GridError::Network("connection refused".into()));
            }
            Ok(vec![
                ColumnDescriptor::new("ID"),
                ColumnDescriptor::new("MesePresentazione"),
                ColumnDescriptor::new("RTC").editable(true),
                ColumnDescriptor::new("Stato").editable(true),
                ColumnDescriptor::new("descrizione").editable(true),
                ColumnDescriptor::new("Note").editable(true).visible(false),
            ])
        }

        async fn partitions(&self) -> Result<Vec<String>, GridError> {
            self.0.calls.borrow_mut().push("partitions");
            Ok(vec!["MAGGIO".into(), "TUTTO".into()])
        }

        async fn fetch_page(&self, request: &DataRequest) -> Result<PageResult, GridError> {
            self.0.calls.borrow_mut().push("data");
            self.0.data_requests.borrow_mut().push(request.clone());
            if self.0.park_pages.get() {
                let (tx, rx) = oneshot::channel();
                self.0.parked.borrow_mut().push((request.draw, tx));
                return rx
                    .await
                    .unwrap_or_else(|_| Err(GridError::Network("cancelled".into())));
            }
            Ok(serve_page(request))
        }

        async fn unique_values(
            &self,
            request: &UniqueValuesRequest,
        ) -> Result<Vec<String>, GridError> {
            self.0.calls.borrow_mut().push("unique_values");
            self.0.unique_requests.borrow_mut().push(request.clone());
            Ok(self.0.unique_reply.borrow().clone())
        }

        async fn update_cell(
            &self,
            request: &UpdateCellRequest,
        ) -> Result<UpdateCellResponse, GridError> {
            self.0.calls.borrow_mut().push("update");
            self.0.update_requests.borrow_mut().push(request.clone());
            self.0
                .update_reply
                .borrow()
                .clone()
                .unwrap_or_else(|| Ok(UpdateCellResponse::success()))
        }

        fn export_url(&self, query: &ExportQuery) -> Result<String, GridError> {
            self.0.calls.borrow_mut().push("export");
            let params = contracts::shared::grid::ExportParams::try_from(query)
                .map_err(GridError::Decode)?;
            Ok(format!(
                "/api/grid/service_orders/export?{}",
                serde_qs::to_string(&params).map_err(|e| GridError::Decode(e.to_string()))?
            ))
        }
    }

    #[derive(Clone, Default)]
    struct ManualTimer {
        sleeping: Rc<RefCell<Vec<(u32, oneshot::Sender<()>)>>>,
        requested: Rc<RefCell<Vec<u32>>>,
    }

    impl ManualTimer {
        fn fire_all(&self) {
            for (_, tx) in self.sleeping.borrow_mut().drain(..) {
                let _ = tx.send(());
            }
        }
    }

    #[async_trait(?Send)]
    impl GridTimer for ManualTimer {
        async fn sleep(&self, ms: u32) {
            let (tx, rx) = oneshot::channel();
            self.requested.borrow_mut().push(ms);
            self.sleeping.borrow_mut().push((ms, tx));
            let _ = rx.await;
        }
    }

    type TestController = GridController<FakeTransport, ManualTimer>;

    fn setup() -> (Rc<TestController>, Rc<FakeServer>, ManualTimer, LocalPool) {
        let server = Rc::new(FakeServer::default());
        let timer = ManualTimer::default();
        let controller = GridController::new(
            FakeTransport(server.clone()),
            timer.clone(),
            GridModel::new("ID", PageLength::Rows(25)),
        );
        (Rc::new(controller), server, timer, LocalPool::new())
    }

    fn loaded(partition: &str) -> (Rc<TestController>, Rc<FakeServer>, ManualTimer, LocalPool) {
        let (controller, server, timer, mut pool) = setup();
        pool.run_until(controller.load_columns()).unwrap();
        if !partition.is_empty() {
            assert_eq!(
                pool.run_until(controller.set_partition(partition)),
                FetchOutcome::Applied
            );
        }
        (controller, server, timer, pool)
    }

    #[test]
    fn test_only_newest_response_is_applied() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");
        server.park_pages.set(true);
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        for technician in ["ROSSI", "VERDI"] {
            let (c, o) = (controller.clone(), outcomes.clone());
            pool.spawner()
                .spawn_local(async move {
                    let outcome = c.apply_exact_filter("RTC", technician).await;
                    o.borrow_mut().push((technician, outcome));
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(controller.snapshot().phase, GridPhase::Loading);

        let requests = server.data_requests.borrow().clone();
        let (older, newer) = (&requests[1], &requests[2]);
        assert_eq!(newer.filters.column_value("RTC"), "VERDI");

        // Newest answers first, the older one arrives late.
        server.release(newer.draw, Ok(serve_page(newer)));
        pool.run_until_stalled();
        server.release(older.draw, Ok(serve_page(older)));
        pool.run_until_stalled();

        assert_eq!(
            outcomes.borrow().as_slice(),
            &[("VERDI", FetchOutcome::Applied), ("ROSSI", FetchOutcome::Stale)]
        );
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, GridPhase::Ready);
        assert!(snapshot.rows.iter().all(|row| row.text("RTC") == "VERDI"));
        assert_eq!(snapshot.summary.filtered, 40);
    }

    #[test]
    fn test_same_value_edit_makes_no_request() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");
        controller.set_edit_mode(true);
        let calls_before = server.calls.borrow().len();

        let outcome = pool
            .run_until(controller.edit_cell(RowId("1".into()), "Stato", json!("APERTO")))
            .unwrap();

        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(server.calls.borrow().len(), calls_before);
    }

    #[test]
    fn test_successful_edit_is_committed() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");
        controller.set_edit_mode(true);

        let outcome = pool
            .run_until(controller.edit_cell(RowId("2".into()), "Stato", json!("CHIUSO")))
            .unwrap();

        assert_eq!(outcome, EditOutcome::Committed);
        let sent = server.update_requests.borrow()[0].clone();
        assert_eq!(
            sent,
            UpdateCellRequest {
                pk: "2".into(),
                field: "Stato".into(),
                value: json!("CHIUSO"),
            }
        );
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.rows[1].text("Stato"), "CHIUSO");
        assert!(snapshot.pending.is_empty());
        assert_eq!(snapshot.phase, GridPhase::Ready);
    }

    #[test]
    fn test_failed_edit_restores_value() {
        for reply in [
            Err(GridError::Network("connection reset".into())),
            Ok(UpdateCellResponse::error("Record non trovato")),
        ] {
            let (controller, server, _timer, mut pool) = loaded("MAGGIO");
            controller.set_edit_mode(true);
            *server.update_reply.borrow_mut() = Some(reply);

            let outcome = pool
                .run_until(controller.edit_cell(RowId("3".into()), "Stato", json!("CHIUSO")))
                .unwrap();

            assert!(matches!(outcome, EditOutcome::RolledBack(_)));
            let snapshot = controller.snapshot();
            assert_eq!(snapshot.rows[2].text("Stato"), "APERTO");
            assert!(snapshot.notice.is_some());
            assert_eq!(snapshot.phase, GridPhase::Ready);
        }
    }

    #[test]
    fn test_edit_refused_when_edit_mode_off() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");
        let result =
            pool.run_until(controller.edit_cell(RowId("1".into()), "Stato", json!("CHIUSO")));
        assert!(matches!(result, Err(GridError::Refused(_))));
        assert!(!server.calls.borrow().contains(&"update"));
    }

    #[test]
    fn test_fetch_never_reaches_transport_without_partition() {
        let (controller, server, timer, mut pool) = loaded("");

        assert_eq!(pool.run_until(controller.fetch_page()), FetchOutcome::Skipped);

        let c = controller.clone();
        pool.spawner()
            .spawn_local(async move {
                assert_eq!(c.apply_filter("descrizione", "pump").await, FetchOutcome::Skipped);
            })
            .unwrap();
        pool.run_until_stalled();
        timer.fire_all();
        pool.run_until_stalled();

        assert!(pool.run_until(controller.unique_values("RTC")).is_empty());
        assert_eq!(
            controller.export_url(ExportFormat::Csv),
            Err(GridError::MissingPartition)
        );
        assert_eq!(server.data_calls(), 0);
        assert!(!server.calls.borrow().contains(&"unique_values"));
        assert_eq!(controller.snapshot().phase, GridPhase::Idle);
    }

    #[test]
    fn test_clearing_partition_returns_to_idle() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");
        assert_eq!(pool.run_until(controller.set_partition("")), FetchOutcome::Skipped);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, GridPhase::Idle);
        assert!(snapshot.rows.is_empty());
        assert_eq!(server.data_calls(), 1);
    }

    #[test]
    fn test_column_visibility_is_local() {
        let (controller, server, _timer, _pool) = loaded("MAGGIO");
        let calls_before = server.calls.borrow().clone();

        assert!(controller.toggle_column_visibility("Stato", false));
        assert!(!controller.toggle_column_visibility("Stato", false));
        assert_eq!(*server.calls.borrow(), calls_before);

        let visible: Vec<String> = controller
            .snapshot()
            .visible_columns()
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(visible, vec!["ID", "MesePresentazione", "RTC", "descrizione"]);
    }

    #[test]
    fn test_export_url_carries_view_state() {
        let (controller, _server, _timer, _pool) = loaded("MAGGIO");
        controller.toggle_column_visibility("Stato", false);
        let url = controller.export_url(ExportFormat::Excel).unwrap();
        assert!(url.starts_with("/api/grid/service_orders/export?"));
        assert!(url.contains("partition=MAGGIO"));
        assert!(url.contains("format=excel"));
        assert!(!url.contains("Stato"));
    }

    #[test]
    fn test_full_partition_summary() {
        let (controller, server, _timer, mut pool) = setup();
        pool.run_until(controller.load_columns()).unwrap();

        let outcome = pool.run_until(controller.set_partition("2024-05"));

        assert_eq!(outcome, FetchOutcome::Applied);
        let request = server.data_requests.borrow()[0].clone();
        assert_eq!(request.filters.partition, "2024-05");
        assert!(request.filters.column_filters.is_empty());

        let summary = controller.snapshot().summary;
        assert_eq!((summary.filtered, summary.total), (120, 120));
        assert_eq!(summary.page_index, 0);
        assert_eq!(summary.page_count, 5);
        assert_eq!(summary.text(), "Vista da 1 a 25 di 120 elementi");
    }

    #[test]
    fn test_debounced_filter_fires_once() {
        let (controller, server, timer, mut pool) = loaded("2024-05");
        let data_before = server.data_calls();
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        for typed in ["p", "pu", "pump"] {
            let (c, o) = (controller.clone(), outcomes.clone());
            pool.spawner()
                .spawn_local(async move {
                    let outcome = c.apply_filter("descrizione", typed).await;
                    o.borrow_mut().push(outcome);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(server.data_calls(), data_before);
        assert_eq!(*timer.requested.borrow(), vec![DEFAULT_DEBOUNCE_MS; 3]);

        timer.fire_all();
        pool.run_until_stalled();

        assert_eq!(server.data_calls(), data_before + 1);
        let last = server.data_requests.borrow().last().cloned().unwrap();
        assert_eq!(last.filters.column_value("descrizione"), "pump");
        assert_eq!(last.page.start, 0);
        assert_eq!(
            outcomes.borrow().as_slice(),
            &[
                FetchOutcome::Superseded,
                FetchOutcome::Superseded,
                FetchOutcome::Applied
            ]
        );
        assert_eq!(
            controller.snapshot().summary.text(),
            "Vista da 1 a 3 di 3 elementi (filtrati da 120 elementi totali)"
        );
    }

    #[test]
    fn test_custom_debounce_window() {
        let server = Rc::new(FakeServer::default());
        let timer = ManualTimer::default();
        let controller = GridController::new(
            FakeTransport(server),
            timer.clone(),
            GridModel::new("ID", PageLength::Rows(25)),
        )
        .with_debounce(400);
        let mut pool = LocalPool::new();
        let controller = Rc::new(controller);
        let c = controller.clone();
        pool.spawner()
            .spawn_local(async move {
                c.set_global_search("pompa").await;
            })
            .unwrap();
        pool.run_until_stalled();
        assert_eq!(*timer.requested.borrow(), vec![400]);
    }

    #[test]
    fn test_submitted_search_skips_pending_debounce() {
        let (controller, server, timer, mut pool) = loaded("MAGGIO");
        let data_before = server.data_calls();
        let typed = Rc::new(RefCell::new(None));

        let (c, t) = (controller.clone(), typed.clone());
        pool.spawner()
            .spawn_local(async move {
                let outcome = c.set_global_search("pomp").await;
                *t.borrow_mut() = Some(outcome);
            })
            .unwrap();
        pool.run_until_stalled();
        assert_eq!(server.data_calls(), data_before);

        assert_eq!(
            pool.run_until(controller.submit_global_search("pompa")),
            FetchOutcome::Applied
        );
        assert_eq!(server.data_calls(), data_before + 1);
        let last = server.data_requests.borrow().last().cloned().unwrap();
        assert_eq!(last.filters.global_search, "pompa");

        // the debounced call wakes up cancelled and sends nothing
        timer.fire_all();
        pool.run_until_stalled();
        assert_eq!(*typed.borrow(), Some(FetchOutcome::Superseded));
        assert_eq!(server.data_calls(), data_before + 1);
    }

    #[test]
    fn test_paging_and_sorting_requests() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");

        assert_eq!(pool.run_until(controller.go_to_page(4)), FetchOutcome::Applied);
        assert_eq!(controller.snapshot().summary.text(), "Vista da 101 a 120 di 120 elementi");
        // Past the last page stays on the last page.
        assert_eq!(pool.run_until(controller.go_to_page(9)), FetchOutcome::Unchanged);

        pool.run_until(controller.toggle_sort("RTC"));
        let last = server.data_requests.borrow().last().cloned().unwrap();
        assert_eq!(last.page.start, 0);
        assert_eq!(last.page.sort.map(|s| s.field), Some("RTC".to_string()));

        pool.run_until(controller.set_page_length(PageLength::All));
        let summary = controller.snapshot().summary;
        assert_eq!((summary.first, summary.last, summary.page_count), (1, 120, 1));
    }

    #[test]
    fn test_unique_values_excludes_own_filter_and_dedups() {
        let (controller, server, _timer, mut pool) = loaded("MAGGIO");
        pool.run_until(controller.apply_exact_filter("RTC", "ROSSI"));
        let c = controller.clone();
        pool.spawner()
            .spawn_local(async move {
                c.apply_filter("descrizione", "pump").await;
            })
            .unwrap();
        pool.run_until_stalled();
        *server.unique_reply.borrow_mut() =
            vec!["ROSSI".into(), "BIANCHI".into(), "ROSSI".into(), "VERDI".into()];

        let values = pool.run_until(controller.unique_values("RTC"));

        assert_eq!(values, vec!["ROSSI", "BIANCHI", "VERDI"]);
        let request = server.unique_requests.borrow()[0].clone();
        assert_eq!(request.column, "RTC");
        assert_eq!(request.partition, "MAGGIO");
        assert!(!request.column_filters.contains_key("RTC"));
        assert!(request.column_filters.contains_key("descrizione"));
    }

    #[test]
    fn test_column_load_failure_keeps_grid_uninitialized() {
        let (controller, server, _timer, mut pool) = setup();
        server.fail_columns.set(true);

        let result = pool.run_until(controller.load_columns());

        assert!(matches!(result, Err(GridError::Network(_))));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, GridPhase::Uninitialized);
        assert_eq!(
            snapshot.notice.map(|n| n.text),
            Some("Errore di rete: connection refused".to_string())
        );
        controller.dismiss_notice();
        assert!(controller.snapshot().notice.is_none());
    }

    #[test]
    fn test_listener_sees_every_change() {
        let (controller, _server, _timer, mut pool) = setup();
        let phases = Rc::new(RefCell::new(Vec::new()));
        let seen = phases.clone();
        controller.set_listener(move |snapshot| seen.borrow_mut().push(snapshot.phase));

        pool.run_until(controller.load_columns()).unwrap();
        pool.run_until(controller.set_partition("MAGGIO"));

        assert_eq!(
            *phases.borrow(),
            vec![
                GridPhase::Uninitialized,
                GridPhase::Idle,
                GridPhase::Loading,
                GridPhase::Ready
            ]
        );
    }
}
