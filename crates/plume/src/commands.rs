use crate::{Args, Command};
use anyhow::{Context, bail};
use plume_core::{Browser, SearchCriteria};
use plume_core::protocol::ActionKind;
use plume_engine::cache::ActionCache;
use plume_engine::config::{ConfigLoader, PlatformConfig, PlumeConfig};
use plume_engine::generator::{HttpGenerator, TextGenerator};
use plume_engine::login::LoginFlow;
use plume_engine::runner::{CancelFlag, Runner, RunnerOptions, TextSource};
use plume_engine::session::SessionStore;
use plume_engine::web::SelectorAdapter;
use plume_wd::WebDriverBrowser;
use serde_json::{Value, json};
use tracing::info;

pub async fn run(args: Args) -> anyhow::Result<Value> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };

    match args.command {
        Command::Login {
            ref platform,
            ref session,
            ref username,
            ref password,
        } => {
            let password = match password {
                Some(p) => p.clone(),
                None => std::env::var("PLUME_PASSWORD")
                    .context("missing --password and PLUME_PASSWORD is unset")?,
            };
            login(
                &config,
                &args.driver_url,
                platform,
                session,
                username,
                &password,
            )
            .await
        }
        Command::AutoComment {
            ref platform,
            ref session,
            ref hashtag,
            ref keywords,
            count,
            ai,
            ref text,
            like,
            max_pages,
        } => {
            let criteria = SearchCriteria {
                hashtag: hashtag.clone(),
                keywords: keywords.clone(),
                source: None,
            };
            let text_source = match (ai, text) {
                (true, _) => TextSource::Generated,
                (false, Some(t)) => TextSource::Fixed(t.clone()),
                (false, None) => bail!("either --ai or --text is required"),
            };
            auto_comment(AutoCommentParams {
                config: &config,
                driver_url: &args.driver_url,
                platform,
                session,
                criteria,
                count,
                text_source,
                like,
                max_pages,
            })
            .await
        }
        Command::CheckSession {
            ref platform,
            ref session,
        } => check_session(&config, platform, session).await,
        Command::Logout {
            ref platform,
            ref session,
        } => logout(&config, platform, session).await,
    }
}

fn platform_config<'a>(config: &'a PlumeConfig, platform: &str) -> anyhow::Result<&'a PlatformConfig> {
    config.platforms.get(platform).with_context(|| {
        format!(
            "no selector pack configured for platform '{platform}' (known: {})",
            config
                .platforms
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

async fn login(
    config: &PlumeConfig,
    driver_url: &str,
    platform: &str,
    session: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<Value> {
    let platform_cfg = platform_config(config, platform)?;
    if platform_cfg.login.url.is_empty() {
        bail!("platform '{platform}' has no login.url configured");
    }

    let mut browser = WebDriverBrowser::new(driver_url);
    browser.launch().await?;

    let mut flow = LoginFlow::new(
        platform_cfg.login.url.clone(),
        platform_cfg.login.selectors.clone(),
    );
    if let Some(settle) = platform_cfg.login.settle_ms {
        flow.settle_ms = settle;
    }

    let result = flow.run(&mut browser, platform, username, password).await;
    browser.close().await.ok();
    let record = result?;

    let store = SessionStore::new(&config.session_dir);
    store.save(platform, session, &record).await?;
    info!(platform, session, "Session saved");

    Ok(json!({
        "ok": true,
        "platform": platform,
        "session": session,
        "cookies": record.cookies.len(),
    }))
}

struct AutoCommentParams<'a> {
    config: &'a PlumeConfig,
    driver_url: &'a str,
    platform: &'a str,
    session: &'a str,
    criteria: SearchCriteria,
    count: usize,
    text_source: TextSource,
    like: bool,
    max_pages: Option<usize>,
}

async fn auto_comment(params: AutoCommentParams<'_>) -> anyhow::Result<Value> {
    let AutoCommentParams {
        config,
        driver_url,
        platform,
        session,
        criteria,
        count,
        text_source,
        like,
        max_pages,
    } = params;

    criteria.validate()?;
    let platform_cfg = platform_config(config, platform)?;

    let store = SessionStore::new(&config.session_dir);
    let Some(record) = store.load(platform, session).await else {
        bail!("no session for {platform}/{session}; run `plume login` first");
    };
    let actor = record
        .metadata
        .handle
        .clone()
        .context("stored session has no handle; log in again")?;

    let generator: Option<HttpGenerator> = if matches!(text_source, TextSource::Generated) {
        let api_key = std::env::var(&config.ai.api_key_env).ok();
        Some(HttpGenerator::new(
            &config.ai.base_url,
            api_key.as_deref(),
            &config.ai.model,
            &config.ai.system_prompt,
        )?)
    } else {
        None
    };

    let mut browser = WebDriverBrowser::new(driver_url);
    browser.launch().await?;

    // Cookies only apply once the origin is loaded.
    browser.navigate(&platform_cfg.base_url).await?;
    browser.set_cookies(record.cookies.clone()).await?;
    browser.navigate(&platform_cfg.base_url).await?;

    let mut cache = ActionCache::new(&config.cache_dir, platform);
    cache.load().await;

    let result = {
        let mut adapter = SelectorAdapter::new(&mut browser, platform, platform_cfg)?;
        let opts = RunnerOptions {
            action: ActionKind::Comment,
            target_successes: count,
            text: text_source,
            secondary_like: like,
            refill_size: config.runner.refill_size,
            max_pages_per_refill: max_pages.unwrap_or(config.runner.max_pages),
            delay_ms: (config.runner.delay_min_ms, config.runner.delay_max_ms),
        };
        let mut runner = Runner::new(
            &mut adapter,
            &mut cache,
            generator.as_ref().map(|g| g as &dyn TextGenerator),
            &actor,
            opts,
        );
        runner.run(&criteria, &CancelFlag::new()).await?
    };

    browser.close().await.ok();

    Ok(json!({
        "ok": true,
        "met_target": result.met_target(),
        "successes": result.successes,
        "attempts": result.attempts,
        "target": result.target,
        "items": result.items,
    }))
}

async fn check_session(
    config: &PlumeConfig,
    platform: &str,
    session: &str,
) -> anyhow::Result<Value> {
    let store = SessionStore::new(&config.session_dir);
    match store.metadata(platform, session).await {
        Some(meta) => Ok(json!({
            "ok": true,
            "platform": meta.platform,
            "saved_at": meta.saved_at,
            "handle": meta.handle,
            "assistant_id": meta.assistant_id,
        })),
        None => Ok(json!({
            "ok": false,
            "error": format!("no session for {platform}/{session}"),
        })),
    }
}

async fn logout(config: &PlumeConfig, platform: &str, session: &str) -> anyhow::Result<Value> {
    let store = SessionStore::new(&config.session_dir);
    store.delete(platform, session).await?;
    Ok(json!({ "ok": true, "platform": platform, "session": session }))
}
