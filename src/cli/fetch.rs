//! `offcache fetch`: run one request through either pipeline

use std::sync::Arc;

use offcache::cache::CacheStore;
use offcache::error::{Error, Result};
use offcache::mode::CacheModeFlag;
use offcache::pipeline::{AsyncCacheHooks, AsyncPipeline, BlockingCacheLayer};
use offcache::transport::{
    AsyncExchange, BlockingHttpClient, Exchange, HttpClient, Method, Request, StatusCode,
};

use super::{CommandContext, FetchArgs, OutputFormat};

/// Where the returned body came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Network,
    Cache,
    Miss,
}

impl Source {
    fn as_str(self) -> &'static str {
        match self {
            Source::Network => "network",
            Source::Cache => "cache",
            Source::Miss => "miss",
        }
    }
}

struct Outcome {
    key: String,
    status: StatusCode,
    source: Source,
    body: String,
}

pub fn run(ctx: &CommandContext, args: &FetchArgs) -> Result<()> {
    let request = build_request(args)?;
    let store: Arc<dyn CacheStore> = ctx.open_store()?;
    let flag = CacheModeFlag::new(ctx.config.cache_only || args.offline);

    let outcome = if args.blocking {
        fetch_blocking(ctx, store, &flag, &request)?
    } else {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(fetch_async(ctx, store, &flag, &request))?
    };

    print_outcome(ctx.format, &outcome)
}

fn build_request(args: &FetchArgs) -> Result<Request> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|_| Error::Other(format!("Invalid HTTP method: {}", args.method)))?;

    let mut request = Request::new(method, args.url.clone());
    if let Some(data) = &args.data {
        request = request.with_body(data.clone());
    }
    request.set_no_cache(args.no_cache);
    Ok(request)
}

fn fetch_blocking(
    ctx: &CommandContext,
    store: Arc<dyn CacheStore>,
    flag: &CacheModeFlag,
    request: &Request,
) -> Result<Outcome> {
    let client = BlockingHttpClient::new(ctx.config.timeout())?;
    let layer = BlockingCacheLayer::new(client, store, flag.gate())
        .with_predicate(ctx.config.predicate());

    let response = layer.send(request)?;
    let status = response.status();
    let source = if response.is_offline_miss() {
        Source::Miss
    } else if response.is_offline_hit() {
        Source::Cache
    } else {
        Source::Network
    };

    Ok(Outcome {
        key: request.cache_key(),
        status,
        source,
        body: response.text()?,
    })
}

async fn fetch_async(
    ctx: &CommandContext,
    store: Arc<dyn CacheStore>,
    flag: &CacheModeFlag,
    request: &Request,
) -> Result<Outcome> {
    let client = HttpClient::new(ctx.config.timeout())?;
    let pipeline = AsyncPipeline::new(client).with_hook(
        AsyncCacheHooks::new(store, flag.gate()).with_predicate(ctx.config.predicate()),
    );

    let response = pipeline.send(request).await?;
    let status = response.status();
    let source = if response.is_offline_miss() {
        Source::Miss
    } else if response.is_offline_hit() {
        Source::Cache
    } else {
        Source::Network
    };

    Ok(Outcome {
        key: request.cache_key(),
        status,
        source,
        body: response.text().await?,
    })
}

fn print_outcome(format: OutputFormat, outcome: &Outcome) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let body = serde_json::from_str::<serde_json::Value>(&outcome.body)
                .unwrap_or_else(|_| serde_json::Value::String(outcome.body.clone()));
            let json = serde_json::json!({
                "key": outcome.key,
                "status": outcome.status.as_u16(),
                "source": outcome.source.as_str(),
                "body": body,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            match outcome.source {
                Source::Miss => eprintln!("No offline data available for this request"),
                Source::Cache => eprintln!("HTTP {} (offline cache)", outcome.status.as_u16()),
                Source::Network => eprintln!("HTTP {}", outcome.status.as_u16()),
            }
            println!("{}", outcome.body);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(method: &str, data: Option<&str>) -> FetchArgs {
        FetchArgs {
            url: "https://api.example/x".to_string(),
            method: method.to_string(),
            data: data.map(str::to_string),
            no_cache: false,
            blocking: false,
            offline: false,
        }
    }

    #[test]
    fn test_build_request_uppercases_method() {
        let request = build_request(&args("post", Some("a=1"))).unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.body(), Some(&b"a=1"[..]));
    }

    #[test]
    fn test_build_request_rejects_bad_method() {
        assert!(build_request(&args("GE T", None)).is_err());
    }

    #[test]
    fn test_build_request_exemption() {
        let mut fetch_args = args("GET", None);
        fetch_args.no_cache = true;
        assert!(build_request(&fetch_args).unwrap().is_no_cache());
    }
}
