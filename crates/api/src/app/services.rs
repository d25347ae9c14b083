//! Infrastructure wiring: store, workflow, session store, sync workers.

use std::sync::Arc;

use anyhow::Context;

use paperstock_broadcast::{BroadcastChannel, LocalChannel};
use paperstock_store::{NoticeListener, RefreshWorker, StockStore, StoreNotice, Workflow};

use crate::config::Config;
use crate::session::SessionStore;

/// The broadcast transport used by this process.
pub type Channel = Arc<LocalChannel<StoreNotice>>;

/// Everything a request handler needs, wired once at startup.
///
/// The workers are held only to keep their threads alive for the lifetime of
/// the services value.
pub struct AppServices {
    workflow: Workflow<Channel>,
    sessions: Arc<SessionStore>,
    _listener: NoticeListener,
    _refresh: RefreshWorker,
}

impl AppServices {
    pub fn workflow(&self) -> &Workflow<Channel> {
        &self.workflow
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }
}

/// Open the store, seed the admin account, and start the sync workers.
pub fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let channel: Channel = Arc::new(LocalChannel::new());

    let store = Arc::new(
        StockStore::open(config.data_dir.clone(), Arc::clone(&channel))
            .with_context(|| format!("opening data directory {}", config.data_dir.display()))?,
    );
    tracing::info!(dir = %config.data_dir.display(), "store opened");

    let workflow = Workflow::new(Arc::clone(&store));
    workflow
        .ensure_admin(&config.admin_username, &config.admin_password)
        .context("seeding admin account")?;

    // Notice-driven reloads pick up writes from other processes sharing the
    // channel; the periodic refresh covers everything else (other processes
    // on the same data directory, missed notices).
    let listener = NoticeListener::spawn(Arc::clone(&store), channel.subscribe());
    let refresh = RefreshWorker::spawn(Arc::clone(&store));

    Ok(AppServices {
        workflow,
        sessions: Arc::new(SessionStore::new()),
        _listener: listener,
        _refresh: refresh,
    })
}
