//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP on a localhost TCP port. Connections are accepted
//! here rather than inside jsonrpsee so each request can carry its peer
//! address (see `CallerAddress`).

use crate::caller::CallerAddress;
use crate::handler::RpcHandler;
use crate::types::{
    GetByIdParams, InventoryNameParams, InventoryParams, ListChecksParams, ListLogsParams,
    ListRunsParams, SubmitRunParams,
};
use jsonrpsee::server::{serve_with_graceful_shutdown, stop_channel, Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::{Methods, RpcModule};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::Service;
use tracing::{debug, info, warn};

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9627;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

/// Register one method: parse params as `P`, then delegate to the handler
fn register<P, R, F, Fut>(
    module: &mut RpcModule<()>,
    name: &'static str,
    handler: &Arc<RpcHandler>,
    method: F,
) -> Result<(), String>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ErrorObjectOwned>> + Send + 'static,
{
    let handler = Arc::clone(handler);
    module
        .register_async_method(name, move |params, _, _| {
            let handler = handler.clone();
            let method = method.clone();
            async move {
                let req: P = params.parse()?;
                method(handler, req).await
            }
        })
        .map(|_| ())
        .map_err(|e| e.to_string())
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// All methods of the public surface
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let h = &self.handler;

        // Runs
        let submit_handler = Arc::clone(h);
        module
            .register_async_method("run.submit.v1", move |params, _, extensions| {
                let handler = submit_handler.clone();
                async move {
                    let p: SubmitRunParams = params.parse()?;
                    let caller = extensions.get::<CallerAddress>().cloned();
                    handler.submit_run(p, caller).await
                }
            })
            .map_err(|e| e.to_string())?;
        register(&mut module, "run.get.v1", h, |h, p: GetByIdParams| async move {
            h.get_run(p).await
        })?;
        register(&mut module, "run.list.v1", h, |h, p: Option<ListRunsParams>| async move {
            h.list_runs(p.unwrap_or_default()).await
        })?;

        // Logs
        register(&mut module, "log.get.v1", h, |h, p: GetByIdParams| async move {
            h.get_log(p).await
        })?;
        register(&mut module, "log.list.v1", h, |h, p: Option<ListLogsParams>| async move {
            h.list_logs(p.unwrap_or_default()).await
        })?;

        // Playbooks
        register(&mut module, "playbook.list.v1", h, |h, _: IgnoredAny| async move {
            h.list_playbooks().await
        })?;

        // Inventories
        register(&mut module, "inventory.create.v1", h, |h, p: InventoryParams| async move {
            h.create_inventory(p).await
        })?;
        register(&mut module, "inventory.get.v1", h, |h, p: InventoryNameParams| async move {
            h.get_inventory(p).await
        })?;
        register(&mut module, "inventory.list.v1", h, |h, _: IgnoredAny| async move {
            h.list_inventories().await
        })?;
        register(&mut module, "inventory.update.v1", h, |h, p: InventoryParams| async move {
            h.update_inventory(p).await
        })?;
        register(&mut module, "inventory.delete.v1", h, |h, p: InventoryNameParams| async move {
            h.delete_inventory(p).await
        })?;

        // Checks
        register(&mut module, "inventory.check.v1", h, |h, p: InventoryNameParams| async move {
            h.check_inventory(p).await
        })?;
        register(&mut module, "check.get.v1", h, |h, p: GetByIdParams| async move {
            h.get_check(p).await
        })?;
        register(&mut module, "check.list.v1", h, |h, p: Option<ListChecksParams>| async move {
            h.list_checks(p.unwrap_or_default()).await
        })?;

        // Admin
        register(&mut module, "admin.sweep.v1", h, |h, _: IgnoredAny| async move {
            h.sweep().await
        })?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the server handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server on TCP"
        );

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        let methods_count = module.method_names().count();
        let methods: Methods = module.into();
        let (stop_handle, server_handle) = stop_channel();
        let service_builder = Server::builder().to_service_builder();

        tokio::spawn(async move {
            loop {
                let (stream, peer) = tokio::select! {
                    accepted = listener.accept() => match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    },
                    _ = stop_handle.clone().shutdown() => break,
                };

                let rpc_service = service_builder.clone().build(methods.clone(), stop_handle.clone());
                let service =
                    tower::service_fn(move |mut req: hyper::Request<hyper::body::Incoming>| {
                        let caller = CallerAddress::resolve(req.headers(), peer);
                        req.extensions_mut().insert(caller);
                        let mut rpc_service = rpc_service.clone();
                        async move { rpc_service.call(req).await.map_err(std::io::Error::other) }
                    });

                let stopped = stop_handle.clone().shutdown();
                tokio::spawn(async move {
                    if let Err(e) = serve_with_graceful_shutdown(stream, service, stopped).await {
                        debug!(peer = %peer, error = %e, "Connection closed with error");
                    }
                });
            }
            info!("JSON-RPC server stopped accepting connections");
        });

        info!(addr = %local_addr, methods = methods_count, "JSON-RPC server started successfully");
        Ok((local_addr, server_handle))
    }
}
