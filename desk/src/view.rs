//! Headless list/detail screen bound to any [`CrudApi`].

use std::path::Path;

use platform_api::{ApiResult, Notice};
use platform_export::{ExportError, Format};
use products_records::{CrudApi, Draft, Row, TableSpec, spec::Column};
use tracing::warn;

use crate::render;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

pub struct CrudView<A: CrudApi> {
    api: A,
    search: String,
    loaded: Vec<Row>,
    shown: Vec<Row>,
    selected: Option<i64>,
}

impl<A: CrudApi> CrudView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            search: String::new(),
            loaded: Vec::new(),
            shown: Vec::new(),
            selected: None,
        }
    }

    pub fn spec(&self) -> &'static TableSpec {
        self.api.spec()
    }

    pub fn rows(&self) -> &[Row] {
        &self.shown
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Reload from the API. A failed load is logged, shows no rows and is
    /// handed back to the caller.
    pub async fn refresh(&mut self) -> ApiResult<()> {
        let result = self.api.list().await;
        self.loaded = match &result {
            Ok(rows) => rows.clone(),
            Err(err) => {
                warn!(table = self.spec().table, error = %err, "loading records failed");
                Vec::new()
            }
        };
        self.apply_search();
        result.map(|_| ())
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.trim().to_lowercase();
        self.apply_search();
    }

    fn apply_search(&mut self) {
        self.shown = if self.search.is_empty() {
            self.loaded.clone()
        } else {
            self.loaded
                .iter()
                .filter(|row| row.matches(&self.search))
                .cloned()
                .collect()
        };
        if let Some(id) = self.selected {
            if !self.shown.iter().any(|row| row.id() == Some(id)) {
                self.selected = None;
            }
        }
    }

    /// Select a displayed row; an id that is not displayed clears the selection.
    pub fn select(&mut self, id: i64) -> bool {
        self.selected = self
            .shown
            .iter()
            .any(|row| row.id() == Some(id))
            .then_some(id);
        self.selected.is_some()
    }

    /// Trim every input and check required fields. Adding requires every
    /// required field; editing checks only the fields being changed.
    pub fn collect_form(
        &self,
        mode: FormMode,
        inputs: &[(String, String)],
    ) -> Result<Draft, Notice> {
        let mut draft = Draft::new();
        for (name, value) in inputs {
            if self.spec().field(name).is_some() {
                draft.set(name.as_str(), Some(value.trim().to_string()));
            }
        }
        for field in self.spec().fields.iter().filter(|f| f.required) {
            let checked = mode == FormMode::Add || draft.contains(field.name);
            if checked && draft.value(field.name).is_none() {
                return Err(Notice::error(
                    "Validation",
                    format!("Field {} is required", field.label),
                ));
            }
        }
        Ok(draft)
    }

    pub async fn save(&mut self, mode: FormMode, inputs: &[(String, String)]) -> Notice {
        let target = match mode {
            FormMode::Add => None,
            FormMode::Edit => match self.selected {
                Some(id) => Some(id),
                None => return no_selection("Edit"),
            },
        };
        let draft = match self.collect_form(mode, inputs) {
            Ok(draft) => draft,
            Err(notice) => return notice,
        };
        let outcome = match target {
            None => self
                .api
                .create(&draft)
                .await
                .map(|id| format!("Record {id} saved")),
            Some(id) => self.api.update(id, &draft).await.map(|changed| {
                if changed {
                    format!("Record {id} updated")
                } else {
                    format!("Record {id} unchanged")
                }
            }),
        };
        match outcome {
            Ok(message) => {
                self.refresh().await.ok();
                Notice::info("Save", message)
            }
            Err(err) => err.notice("Save"),
        }
    }

    /// `None` when the user did not confirm; nothing is deleted then.
    pub async fn delete_selected(&mut self, confirmed: bool) -> Option<Notice> {
        let Some(id) = self.selected else {
            return Some(no_selection("Delete"));
        };
        if !confirmed {
            return None;
        }
        let notice = match self.api.delete(id).await {
            Ok(true) => Notice::info("Delete", format!("Record {id} deleted")),
            Ok(false) => Notice::info("Delete", format!("Record {id} was already gone")),
            Err(err) => return Some(err.notice("Delete")),
        };
        self.selected = None;
        self.refresh().await.ok();
        Some(notice)
    }

    /// Header labels and display text of the shown rows for `columns`.
    pub fn table(&self, columns: &[Column]) -> (Vec<String>, Vec<Vec<String>>) {
        render::cells(columns, &self.shown)
    }

    /// Write every column of the shown rows.
    pub fn export(&self, format: Format, path: &Path) -> Notice {
        let (headers, rows) = self.table(&self.spec().columns());
        let result = match format {
            Format::Csv => platform_export::write_csv(path, &headers, &rows),
            Format::Pdf => platform_export::write_pdf(path, self.spec().title, &headers, &rows),
        };
        match result {
            Ok(()) => Notice::info(
                "Export",
                format!("{} saved: {}", format.extension().to_uppercase(), path.display()),
            ),
            Err(ExportError::Empty) => Notice::info("Export", ExportError::Empty.to_string()),
            Err(err) => {
                warn!(error = %err, path = %path.display(), "export failed");
                Notice::error("Export", format!("Export failed: {err}"))
            }
        }
    }
}

fn no_selection(title: &str) -> Notice {
    Notice::error(title, "Please select a record")
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use platform_api::ApiError;
    use products_records::{Cell, tables};

    use super::*;

    #[derive(Default)]
    struct MemoryApi {
        rows: Mutex<Vec<Row>>,
        next_id: AtomicUsize,
        calls: AtomicUsize,
        broken: bool,
    }

    impl MemoryApi {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn fail<T>(&self) -> ApiResult<T> {
            Err(ApiError::operation(anyhow::anyhow!("disk I/O error")))
        }
    }

    #[async_trait]
    impl CrudApi for MemoryApi {
        fn spec(&self) -> &'static TableSpec {
            &tables::ORG_CHART
        }

        async fn list(&self) -> ApiResult<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return self.fail();
            }
            let mut rows = self.rows.lock().unwrap().clone();
            rows.reverse();
            Ok(rows)
        }

        async fn create(&self, draft: &Draft) -> ApiResult<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return self.fail();
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
            let mut cells = vec![("id", Cell::Integer(id))];
            for field in tables::ORG_CHART.fields {
                let cell = draft
                    .value(field.name)
                    .map(|v| Cell::Text(v.to_string()))
                    .unwrap_or(Cell::Null);
                cells.push((field.name, cell));
            }
            self.rows.lock().unwrap().push(Row::new(cells));
            Ok(id)
        }

        async fn update(&self, _id: i64, _draft: &Draft) -> ApiResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn delete(&self, id: i64) -> ApiResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id() != Some(id));
            Ok(rows.len() < before)
        }
    }

    fn inputs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn populated() -> CrudView<MemoryApi> {
        let mut view = CrudView::new(MemoryApi::default());
        for (name, position) in [("Rahim", "Director"), ("Siti", "Clerk"), ("Bala", "Driver")] {
            let notice = view
                .save(FormMode::Add, &inputs(&[("name", name), ("position", position)]))
                .await;
            assert!(!notice.is_error(), "{notice}");
        }
        view
    }

    #[tokio::test]
    async fn required_fields_are_checked_before_any_call() {
        let mut view = CrudView::new(MemoryApi::default());
        let notice = view
            .save(FormMode::Add, &inputs(&[("name", "  Rahim "), ("position", "   ")]))
            .await;
        assert!(notice.is_error());
        assert_eq!(notice.message, "Field Position is required");
        assert_eq!(view.api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn saved_rows_show_newest_first_with_trimmed_values() {
        let mut view = CrudView::new(MemoryApi::default());
        view.save(FormMode::Add, &inputs(&[("name", "  Rahim "), ("position", "Director")]))
            .await;
        view.save(FormMode::Add, &inputs(&[("name", "Siti"), ("position", "Clerk")]))
            .await;
        let names: Vec<_> = view.rows().iter().map(|r| r.text("name")).collect();
        assert_eq!(names, vec!["Siti", "Rahim"]);
    }

    #[tokio::test]
    async fn failed_list_shows_no_rows() {
        let mut view = CrudView::new(MemoryApi::broken());
        let err = view.refresh().await.unwrap_err();
        assert_eq!(err.notice("Load").message, "Load failed: disk I/O error");
        assert!(view.rows().is_empty());
    }

    #[tokio::test]
    async fn failed_save_is_reported() {
        let mut view = CrudView::new(MemoryApi::broken());
        let notice = view
            .save(FormMode::Add, &inputs(&[("name", "Rahim"), ("position", "Director")]))
            .await;
        assert!(notice.is_error());
        assert_eq!(notice.message, "Save failed: disk I/O error");
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let mut view = populated().await;
        view.set_search("  CLERK ");
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.rows()[0].text("name"), "Siti");
        view.set_search("");
        assert_eq!(view.rows().len(), 3);
    }

    #[tokio::test]
    async fn edit_and_delete_need_a_selection() {
        let mut view = populated().await;
        let notice = view.save(FormMode::Edit, &inputs(&[("unit", "HQ")])).await;
        assert_eq!(notice.message, "Please select a record");
        let notice = view.delete_selected(true).await.unwrap();
        assert_eq!(notice.message, "Please select a record");
        assert!(!view.select(99));
    }

    #[tokio::test]
    async fn editing_may_not_blank_a_required_field() {
        let mut view = populated().await;
        assert!(view.select(1));
        let notice = view.save(FormMode::Edit, &inputs(&[("name", " ")])).await;
        assert_eq!(notice.message, "Field Name is required");
        let notice = view.save(FormMode::Edit, &inputs(&[("unit", "HQ")])).await;
        assert_eq!(notice.message, "Record 1 updated");
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut view = populated().await;
        assert!(view.select(2));
        assert!(view.delete_selected(false).await.is_none());
        assert_eq!(view.rows().len(), 3);

        let notice = view.delete_selected(true).await.unwrap();
        assert_eq!(notice.message, "Record 2 deleted");
        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.selected(), None);
    }

    #[tokio::test]
    async fn export_writes_displayed_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = populated().await;

        view.set_search("nobody");
        let path = dir.path().join("empty.csv");
        let notice = view.export(Format::Csv, &path);
        assert_eq!(notice.message, "No data to export");
        assert!(!path.exists());

        view.set_search("bala");
        let path = dir.path().join("org_chart.csv");
        let notice = view.export(Format::Csv, &path);
        assert!(!notice.is_error(), "{notice}");
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Name,Position,Unit,Supervisor ID,Phone,Email,Created")
        );
        assert_eq!(lines.next(), Some("3,Bala,Driver,,,,,"));
        assert_eq!(lines.next(), None);
    }
}
