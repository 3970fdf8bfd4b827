use std::{env, io, process::ExitCode};

use tf_doc_vectorizer::{
    tokenize_corpus, write_learning_data, Document, DocumentFrequency, LabelMapping, Result,
    VectorizerConfig,
};
use tracing::{error, info};

// usage: tf-doc-vectorizer [config.json]
// learning data goes to stdout, logs to stderr
fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => VectorizerConfig::from_json_file(path)?,
        None => VectorizerConfig::default(),
    };
    info!(?config, "starting");

    let tokenizer = config.build_tokenizer()?;
    let mut docs = Document::load_docs(&config.list_file, &config.prefix)?;

    let doc_freq = DocumentFrequency::new();
    tokenize_corpus(&mut docs, &tokenizer, Some(&doc_freq))?;

    let mut mapping = match &config.label_mapping {
        Some(path) if path.exists() => LabelMapping::load(path)?,
        _ => LabelMapping::new(),
    };
    let out = io::BufWriter::new(io::stdout().lock());
    write_learning_data(&docs, &mut mapping, config.zero_indexed_labels, out)?;

    if let Some(path) = &config.label_mapping {
        mapping.save(path)?;
        info!(labels = mapping.len(), path = %path.display(), "saved label mapping");
    }
    Ok(())
}
