// Query Service - paginated, filtered reads over runs, logs and checks

mod pagination;

pub use pagination::{Page, PageWindow};

use crate::application::Stores;
use crate::domain::{CheckId, ExecutionLog, InventoryCheck, LogId, Run, RunId};
use crate::error::{AppError, Result};
use crate::port::{CheckFilter, LogFilter, RunFilter};
use tracing::debug;

/// Query Service
///
/// Read-only; never touches the execution slot.
#[derive(Clone)]
pub struct QueryService {
    stores: Stores,
    page_size: i64,
}

impl QueryService {
    pub fn new(stores: Stores, page_size: i64) -> Self {
        Self {
            stores,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub async fn list_runs(&self, filter: &RunFilter, page: i64) -> Result<Page<Run>> {
        let total = self.stores.runs.count(filter).await?;
        let window = PageWindow::new(total, page, self.page_size);
        let items = if total == 0 {
            Vec::new()
        } else {
            self.stores
                .runs
                .list(filter, window.limit(), window.offset())
                .await?
        };
        debug!(total = total, page = window.current_page, "Listed runs");
        Ok(window.into_page(items))
    }

    pub async fn get_run(&self, id: RunId) -> Result<Run> {
        self.stores
            .runs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {} not found", id)))
    }

    pub async fn list_logs(&self, filter: &LogFilter, page: i64) -> Result<Page<ExecutionLog>> {
        let total = self.stores.logs.count(filter).await?;
        let window = PageWindow::new(total, page, self.page_size);
        let items = if total == 0 {
            Vec::new()
        } else {
            self.stores
                .logs
                .list(filter, window.limit(), window.offset())
                .await?
        };
        debug!(total = total, page = window.current_page, "Listed logs");
        Ok(window.into_page(items))
    }

    pub async fn get_log(&self, id: LogId) -> Result<ExecutionLog> {
        self.stores
            .logs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Log {} not found", id)))
    }

    pub async fn list_checks(
        &self,
        filter: &CheckFilter,
        page: i64,
    ) -> Result<Page<InventoryCheck>> {
        let total = self.stores.checks.count(filter).await?;
        let window = PageWindow::new(total, page, self.page_size);
        let items = if total == 0 {
            Vec::new()
        } else {
            self.stores
                .checks
                .list(filter, window.limit(), window.offset())
                .await?
        };
        debug!(total = total, page = window.current_page, "Listed checks");
        Ok(window.into_page(items))
    }

    pub async fn get_check(&self, id: CheckId) -> Result<InventoryCheck> {
        self.stores
            .checks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Check {} not found", id)))
    }
}
