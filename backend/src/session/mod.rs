//! Session Store - Per-user tables kept in memory between requests
//!
//! Each session holds the files its user uploaded. A file is parsed once;
//! the store keeps the table as parsed, the working table that cleaning
//! mutates, the selected columns and the stages the file went through.
//!
//! Sessions idle for longer than the store's time-to-live are evicted the
//! next time the store is accessed. Nothing is persisted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::chart::{visualize, Visualization};
use crate::error::{SessionError, SessionResult};
use crate::export::{export_table, ExportArtifact};
use crate::models::{Table, UploadedFile};
use crate::parser::{parse_upload, TableFormat};
use crate::transform::{fill_missing_with_mean, ordered_selection, project, remove_duplicates, FillReport};

/// Default idle time before a session is dropped
pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// Steps a file has gone through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Uploaded,
    Previewed,
    Cleaned,
    Visualized,
    Projected,
    Exported,
}

/// One uploaded file and its tables
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Name as uploaded
    pub name: String,
    /// Upload size in bytes
    pub size: usize,
    pub format: TableFormat,
    /// Encoding used to decode text (CSV only)
    pub encoding: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    original: Table,
    table: Table,
    selection: Vec<String>,
    stages: Vec<Stage>,
}

impl FileEntry {
    /// Parse an upload into a new entry.
    pub fn from_upload(file: &UploadedFile) -> SessionResult<Self> {
        let parsed = parse_upload(file)?;
        let selection = parsed.table.column_names();

        Ok(Self {
            id: Uuid::new_v4(),
            name: file.name.clone(),
            size: file.size(),
            format: parsed.format,
            encoding: parsed.encoding,
            uploaded_at: Utc::now(),
            original: parsed.table.clone(),
            table: parsed.table,
            selection,
            stages: vec![Stage::Uploaded, Stage::Previewed],
        })
    }

    /// Working table, after cleaning.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Table as parsed.
    pub fn original(&self) -> &Table {
        &self.original
    }

    /// Selected columns, in table order.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Stages reached, in the order first reached.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn has_stage(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Working table restricted to the selected columns.
    pub fn view(&self) -> SessionResult<Table> {
        Ok(project(&self.table, &self.selection)?)
    }

    fn record(&mut self, stage: Stage) {
        if !self.has_stage(stage) {
            self.stages.push(stage);
        }
    }

    fn reset(&mut self) {
        self.table = self.original.clone();
        self.selection = self.table.column_names();
        self.stages = vec![Stage::Uploaded, Stage::Previewed];
    }
}

/// One user's files
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    files: Vec<FileEntry>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            files: Vec::new(),
        }
    }

    /// Files in upload order
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file(&self, id: Uuid) -> SessionResult<&FileEntry> {
        self.files
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| SessionError::FileNotFound(id.to_string()))
    }

    fn file_mut(&mut self, id: Uuid) -> SessionResult<&mut FileEntry> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| SessionError::FileNotFound(id.to_string()))
    }
}

/// Store for all live sessions
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store with the default time-to-live
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// Create a store with a custom time-to-live
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start a new session
    pub fn create(&mut self) -> Uuid {
        let now = Utc::now();
        self.evict_idle(now);

        let session = Session::new(now);
        let id = session.id;
        self.sessions.insert(id, session);
        tracing::info!(session = %id, "session created");
        id
    }

    /// End a session and drop its files
    pub fn remove(&mut self, id: Uuid) -> SessionResult<()> {
        if self.sessions.remove(&id).is_none() {
            return Err(SessionError::SessionNotFound(id.to_string()));
        }
        tracing::info!(session = %id, "session ended");
        Ok(())
    }

    /// Look up a session, marking it active
    pub fn get(&mut self, id: Uuid) -> SessionResult<&Session> {
        self.session_mut(id).map(|s| &*s)
    }

    /// Drop sessions idle for longer than the time-to-live.
    ///
    /// Returns the number of sessions dropped.
    pub fn evict_idle(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now - s.last_active <= ttl);

        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "evicted idle sessions");
        }
        evicted
    }

    fn session_mut(&mut self, id: Uuid) -> SessionResult<&mut Session> {
        let now = Utc::now();
        self.evict_idle(now);

        let session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| SessionError::SessionNotFound(id.to_string()))?;
        session.last_active = now;
        Ok(session)
    }

    fn file_mut(&mut self, session: Uuid, file: Uuid) -> SessionResult<&mut FileEntry> {
        self.session_mut(session)?.file_mut(file)
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Parse an upload and add it to the session.
    pub fn add_file(&mut self, session: Uuid, file: &UploadedFile) -> SessionResult<&FileEntry> {
        let session = self.session_mut(session)?;

        log_info(format!("📄 Uploaded: {} ({:.2} KB)", file.name, file.size_kb()));
        let entry = FileEntry::from_upload(file)?;
        log_info_indent(
            format!(
                "{} rows, {} columns",
                entry.table.row_count(),
                entry.table.column_count()
            ),
            1,
        );

        session.files.push(entry);
        let index = session.files.len() - 1;
        Ok(&session.files[index])
    }

    /// Files of a session, in upload order
    pub fn files(&mut self, session: Uuid) -> SessionResult<&[FileEntry]> {
        Ok(self.session_mut(session)?.files())
    }

    pub fn file(&mut self, session: Uuid, file: Uuid) -> SessionResult<&FileEntry> {
        self.file_mut(session, file).map(|e| &*e)
    }

    // ========================================================================
    // Per-file operations
    // ========================================================================

    /// Remove duplicate rows from the working table.
    pub fn dedup(&mut self, session: Uuid, file: Uuid) -> SessionResult<usize> {
        let entry = self.file_mut(session, file)?;
        let removed = remove_duplicates(&mut entry.table);
        entry.record(Stage::Cleaned);
        log_success(format!("Duplicates Removed! ({}: {} rows)", entry.name, removed));
        Ok(removed)
    }

    /// Fill missing numeric cells with their column mean.
    pub fn fill_missing(&mut self, session: Uuid, file: Uuid) -> SessionResult<FillReport> {
        let entry = self.file_mut(session, file)?;
        let report = fill_missing_with_mean(&mut entry.table);
        entry.record(Stage::Cleaned);
        log_success(format!(
            "Missing Values have been Filled! ({}: {} cells)",
            entry.name,
            report.total_filled()
        ));
        Ok(report)
    }

    /// Bar chart of a numeric column of the working table.
    pub fn chart(&mut self, session: Uuid, file: Uuid, column: Option<&str>) -> SessionResult<Visualization> {
        let entry = self.file_mut(session, file)?;
        let visualization = visualize(&entry.table, column)?;
        match &visualization {
            Visualization::Chart { .. } => entry.record(Stage::Visualized),
            Visualization::Skipped { warning } => log_warning(format!("{}: {}", entry.name, warning)),
        }
        Ok(visualization)
    }

    /// Set the columns kept on export.
    ///
    /// Returns the stored selection, in table order.
    pub fn select_columns(
        &mut self,
        session: Uuid,
        file: Uuid,
        columns: &[String],
    ) -> SessionResult<Vec<String>> {
        let entry = self.file_mut(session, file)?;
        entry.selection = ordered_selection(&entry.table, columns)?;
        entry.record(Stage::Projected);
        Ok(entry.selection.clone())
    }

    /// Serialize the selected columns of the working table.
    pub fn export(&mut self, session: Uuid, file: Uuid, format: TableFormat) -> SessionResult<ExportArtifact> {
        let entry = self.file_mut(session, file)?;
        let view = entry.view()?;
        let artifact = export_table(&view, &entry.name, format)?;
        entry.record(Stage::Exported);
        log_success(format!("{} converted to {}", entry.name, artifact.file_name));
        Ok(artifact)
    }

    /// Restore the table as parsed and select every column again.
    pub fn reset(&mut self, session: Uuid, file: Uuid) -> SessionResult<&FileEntry> {
        let entry = self.file_mut(session, file)?;
        entry.reset();
        log_info(format!("{} restored to its uploaded state", entry.name));
        Ok(&*entry)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a session id from a request path.
pub fn parse_session_id(raw: &str) -> SessionResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| SessionError::SessionNotFound(raw.to_string()))
}

/// Parse a file id from a request path.
pub fn parse_file_id(raw: &str) -> SessionResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| SessionError::FileNotFound(raw.to_string()))
}
