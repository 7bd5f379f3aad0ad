//! RPC Method Handlers
//!
//! Thin adapters from wire types to the application services.

use crate::caller::CallerAddress;
use crate::error::to_rpc_error;
use crate::types::{
    CheckInventoryResponse, CheckView, DeleteInventoryResponse, GetByIdParams,
    InventoryListResponse, InventoryNameParams, InventoryParams, InventoryView, ListChecksParams,
    ListLogsParams, ListRunsParams, LogView, PageResponse, PlaybookListResponse, RunView,
    SubmitRunParams, SubmitRunResponse, SweepResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use playdeck_core::application::{
    InventoryService, Orchestrator, Prober, QueryService, RetentionSweeper,
};
use playdeck_core::domain::{CheckStatus, RunStatus};
use playdeck_core::port::PlaybookCatalog;
use std::sync::Arc;
use tracing::info;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected application services
pub struct RpcHandler {
    orchestrator: Orchestrator,
    prober: Prober,
    query: QueryService,
    inventories: InventoryService,
    playbooks: Arc<dyn PlaybookCatalog>,
    sweeper: Arc<RetentionSweeper>,
}

impl RpcHandler {
    pub fn new(
        orchestrator: Orchestrator,
        prober: Prober,
        query: QueryService,
        inventories: InventoryService,
        playbooks: Arc<dyn PlaybookCatalog>,
        sweeper: Arc<RetentionSweeper>,
    ) -> Self {
        Self {
            orchestrator,
            prober,
            query,
            inventories,
            playbooks,
            sweeper,
        }
    }

    /// run.submit.v1
    pub async fn submit_run(
        &self,
        params: SubmitRunParams,
        caller: Option<CallerAddress>,
    ) -> RpcResult<SubmitRunResponse> {
        let accepted = self
            .orchestrator
            .submit(params.into_request(caller))
            .await
            .map_err(to_rpc_error)?;

        Ok(SubmitRunResponse {
            run_id: accepted.id,
            status: RunStatus::Started.to_string(),
        })
    }

    /// run.get.v1
    pub async fn get_run(&self, params: GetByIdParams) -> RpcResult<RunView> {
        let run = self.query.get_run(params.id).await.map_err(to_rpc_error)?;
        Ok(run.into())
    }

    /// run.list.v1
    pub async fn list_runs(&self, params: ListRunsParams) -> RpcResult<PageResponse<RunView>> {
        let filter = params.to_filter().map_err(to_rpc_error)?;
        let page = self
            .query
            .list_runs(&filter, params.page.unwrap_or(1))
            .await
            .map_err(to_rpc_error)?;
        Ok(PageResponse::from_page(page))
    }

    /// log.get.v1
    pub async fn get_log(&self, params: GetByIdParams) -> RpcResult<LogView> {
        let log = self.query.get_log(params.id).await.map_err(to_rpc_error)?;
        Ok(log.into())
    }

    /// log.list.v1
    pub async fn list_logs(&self, params: ListLogsParams) -> RpcResult<PageResponse<LogView>> {
        let filter = params.to_filter().map_err(to_rpc_error)?;
        let page = self
            .query
            .list_logs(&filter, params.page.unwrap_or(1))
            .await
            .map_err(to_rpc_error)?;
        Ok(PageResponse::from_page(page))
    }

    /// playbook.list.v1
    pub async fn list_playbooks(&self) -> RpcResult<PlaybookListResponse> {
        let playbooks = self.playbooks.list().await.map_err(to_rpc_error)?;
        Ok(PlaybookListResponse { playbooks })
    }

    /// inventory.create.v1
    pub async fn create_inventory(&self, params: InventoryParams) -> RpcResult<InventoryView> {
        let inventory = self
            .inventories
            .create(&params.name, &params.content)
            .await
            .map_err(to_rpc_error)?;
        Ok(inventory.into())
    }

    /// inventory.get.v1
    pub async fn get_inventory(&self, params: InventoryNameParams) -> RpcResult<InventoryView> {
        let inventory = self
            .inventories
            .get(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(inventory.into())
    }

    /// inventory.list.v1
    pub async fn list_inventories(&self) -> RpcResult<InventoryListResponse> {
        let inventories = self.inventories.list().await.map_err(to_rpc_error)?;
        Ok(InventoryListResponse {
            inventories: inventories.into_iter().map(Into::into).collect(),
        })
    }

    /// inventory.update.v1
    pub async fn update_inventory(&self, params: InventoryParams) -> RpcResult<InventoryView> {
        let inventory = self
            .inventories
            .update(&params.name, &params.content)
            .await
            .map_err(to_rpc_error)?;
        Ok(inventory.into())
    }

    /// inventory.delete.v1
    pub async fn delete_inventory(
        &self,
        params: InventoryNameParams,
    ) -> RpcResult<DeleteInventoryResponse> {
        self.inventories
            .delete(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(DeleteInventoryResponse {
            name: params.name,
            deleted: true,
        })
    }

    /// inventory.check.v1
    pub async fn check_inventory(
        &self,
        params: InventoryNameParams,
    ) -> RpcResult<CheckInventoryResponse> {
        let accepted = self
            .prober
            .probe(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(CheckInventoryResponse {
            check_id: accepted.id,
            status: CheckStatus::Pending,
        })
    }

    /// check.get.v1
    pub async fn get_check(&self, params: GetByIdParams) -> RpcResult<CheckView> {
        let check = self.query.get_check(params.id).await.map_err(to_rpc_error)?;
        Ok(check.into())
    }

    /// check.list.v1
    pub async fn list_checks(
        &self,
        params: ListChecksParams,
    ) -> RpcResult<PageResponse<CheckView>> {
        let filter = params.to_filter().map_err(to_rpc_error)?;
        let page = self
            .query
            .list_checks(&filter, params.page.unwrap_or(1))
            .await
            .map_err(to_rpc_error)?;
        Ok(PageResponse::from_page(page))
    }

    /// admin.sweep.v1
    pub async fn sweep(&self) -> RpcResult<SweepResponse> {
        info!("Manual retention sweep requested");
        Ok(self.sweeper.sweep().await.into())
    }
}
