use anyhow::Result;
use ptui::application::cli;
use ptui::application::ui;
use ptui::domain::models::Action;
use ptui::domain::models::Event;
use ptui::domain::services::actions::ActionsService;
use ptui::domain::services::AppStateProps;
use ptui::infrastructure::clients::ApiClientManager;
use ptui::infrastructure::logging;
use ptui::infrastructure::logging::LogBuffer;
use ptui::Config;
use ptui::ConfigKey;
use tokio::sync::mpsc;
use tokio::task;

#[tokio::main]
async fn main() -> Result<()> {
    let ready = cli::parse().await?;
    if !ready {
        return Ok(());
    }

    let tenants = cli::ensure_tenants()?;

    let log_buffer = LogBuffer::default();
    let _log_guard = logging::init(
        &Config::get(ConfigKey::LogFile),
        &Config::get(ConfigKey::LogLevel),
        log_buffer.clone(),
    )?;
    Config::log_effective();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        tenants = tenants.len(),
        "starting"
    );

    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return ActionsService::start(Box::new(ApiClientManager::get), event_tx, &mut action_rx)
            .await;
    });

    let mut tenant_id = None;
    if !Config::get(ConfigKey::Tenant).is_empty() {
        tenant_id = Some(Config::get(ConfigKey::Tenant));
    }

    let app_state_props = AppStateProps {
        tenants,
        tenant_id,
        log_buffer,
    };

    let result = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui::run(app_state_props, action_tx, event_rx) => res,
    );

    if result.is_err() {
        ui::destruct_terminal_for_panic();
    }

    return result;
}
