use std::{path::Path, sync::Arc};

use {
    anyhow::Context as _,
    mnemo_database::{DatabaseManager, journal_mode, repo_db_path},
    mnemo_embeddings::{
        EmbeddingCache, EmbeddingProvider, EmbeddingStore, MemoryContent, SearchResult,
        SemanticSearch, SqliteEmbeddingStore, VectorSearch,
        embeddings_openai::OpenAiEmbeddingProvider,
    },
    tracing::info,
};

use crate::{
    cli::{Command, IndexArgs, SearchArgs, limit_from_arg},
    config::Config,
};

pub async fn run(
    command: &Command,
    repo: &Path,
    config: &Config,
    manager: &DatabaseManager,
) -> anyhow::Result<()> {
    let pool = manager.get_handle(repo).await?;
    let store = Arc::new(SqliteEmbeddingStore::new(pool.clone()));

    match command {
        Command::Stats => {
            let count = store.count().await?;
            println!("database     {}", repo_db_path(repo).display());
            println!("journal_mode {}", journal_mode(&pool).await?);
            println!("embeddings   {count}");
            println!(
                "model        {} (version {})",
                config.embeddings.model_name, config.embeddings.model_version
            );
        },
        Command::Show(args) => match store.get(&args.slug).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => anyhow::bail!("no embedding cached for {}", args.slug),
        },
        Command::Evict(args) => {
            let search = VectorSearch::new(store);
            for slug in &args.slugs {
                if search.delete(slug).await? {
                    println!("evicted {slug}");
                } else {
                    println!("not cached {slug}");
                }
            }
        },
        Command::Search(args) => {
            let cache = Arc::new(build_cache(config, store.clone())?);
            let semantic = SemanticSearch::new(cache, VectorSearch::new(store));
            let results = search(&semantic, args).await?;
            print_results(&results, args.json)?;
        },
        Command::Index(args) => {
            let cache = build_cache(config, store)?;
            index(&cache, args).await?;
        },
    }
    Ok(())
}

fn build_cache(config: &Config, store: Arc<SqliteEmbeddingStore>) -> anyhow::Result<EmbeddingCache> {
    let provider = OpenAiEmbeddingProvider::from_config(&config.embeddings)?;
    info!(
        provider = provider.provider_key(),
        endpoint = %provider.endpoint(),
        "using embedding provider"
    );
    Ok(EmbeddingCache::new(
        &config.embeddings,
        store,
        Arc::new(provider),
    ))
}

async fn search(semantic: &SemanticSearch, args: &SearchArgs) -> anyhow::Result<Vec<SearchResult>> {
    let limit = limit_from_arg(args.limit);
    let results = if !args.keywords.is_empty() {
        let mut results = semantic
            .hybrid_search(&args.query, &args.keywords, limit)
            .await?;
        if let Some(threshold) = args.threshold {
            results.retain(|r| r.similarity >= threshold);
        }
        results
    } else if let Some(threshold) = args.threshold {
        semantic
            .search_with_threshold(&args.query, threshold, limit)
            .await?
    } else {
        semantic.search(&args.query, limit).await?
    };
    Ok(results)
}

async fn index(cache: &EmbeddingCache, args: &IndexArgs) -> anyhow::Result<()> {
    let mut items = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("no usable file name in {}", path.display()))?;
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        items.push(MemoryContent::new(slug, content));
    }

    let report = cache.index_all(&items).await;
    println!("indexed={} failed={}", report.indexed, report.failed);
    Ok(())
}

fn print_results(results: &[SearchResult], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("no results");
    }
    for r in results {
        println!("{:>7.4}  {}", r.similarity, r.slug);
    }
    Ok(())
}
