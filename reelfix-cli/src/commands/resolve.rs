use std::path::Path;

use reelfix_core::{
    IdHint, MediaIdentity, MediaType, ParsedName, ResolveRequest, extract_default_id,
};

use crate::CliError;

pub(crate) struct ResolveArgs {
    pub query: String,
    pub media_type: Option<MediaType>,
    pub year: Option<u32>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub parsed: bool,
}

/// Build a request from the command line. A URL or bare id becomes an id
/// hint; anything else is searched as a title.
fn build_request(args: ResolveArgs) -> Result<ResolveRequest, CliError> {
    if args.parsed {
        let parsed: ParsedName = serde_json::from_str(&args.query)?;
        return parsed
            .into_request()
            .map_err(|e| CliError::input(e.to_string()));
    }

    let query = args.query.trim();
    let hint = extract_default_id(query)
        .map(|id| IdHint::parse(&id))
        .or_else(|| match IdHint::parse(query) {
            IdHint::Invalid(_) => None,
            hint => Some(hint),
        });

    let media_type = args.media_type.unwrap_or(
        if args.episode.is_some() || query.contains("/tv/") {
            MediaType::Tv
        } else {
            MediaType::Movie
        },
    );

    let title = match &hint {
        Some(IdHint::Imdb(id)) => id.clone(),
        Some(IdHint::Tmdb(id)) => id.to_string(),
        _ => query.to_string(),
    };
    let mut identity = MediaIdentity::new(title, media_type)
        .map_err(|e| CliError::input(e.to_string()))?
        .with_year(args.year);
    if let Some(hint) = &hint {
        identity = identity.with_hint(hint);
    }

    Ok(match args.episode {
        Some(episode) => ResolveRequest::episode(identity, args.season.unwrap_or(1), episode),
        None => ResolveRequest::new(identity),
    })
}

/// Resolve one title and print the result as JSON.
pub(crate) fn run_resolve(config_path: Option<&Path>, args: ResolveArgs) -> Result<(), CliError> {
    let config = super::load_config(config_path)?;
    let request = build_request(args)?;
    let resolver = reelfix_provider::connect(&config).map_err(|e| CliError::config(e.to_string()))?;

    log::debug!("Resolving {:?}", request.identity);
    let rt = crate::runtime()?;
    let Some(resolved) = rt.block_on(resolver.resolve(&request)) else {
        log::warn!("No provider knows '{}'", request.identity.title);
        return Ok(());
    };

    for warning in &resolved.warnings {
        log::warn!("{warning}");
    }
    let output = serde_json::json!({
        "provider": resolved.provider.to_string(),
        "method": resolved.method.to_string(),
        "record": resolved.record,
        "episode": resolved.episode,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
