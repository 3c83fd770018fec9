use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use marinetext_classifiers::{
    rank_scores, ArchitectureConfig, ClassificationResult, Classifier, LexiconClassifier,
    ModelConfig, ModelLoaderPlugin, ModelSource, ModelsConfig,
};
use marinetext_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};

const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];
const TOKENIZER_FILES: [&str; 2] = ["tokenizer.json", "vocab.txt"];

/// Candle/HuggingFace-backed model loader plugin.
pub struct ExternalMlModelLoader {
    config: ModelsConfig,
    cache_dir: PathBuf,
}

impl ExternalMlModelLoader {
    /// Create plugin from a parsed models file.
    pub fn from_config(config: ModelsConfig) -> Self {
        let cache_dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);
        Self { config, cache_dir }
    }

    /// Create plugin by loading a models file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(ModelsConfig::from_file(path)?))
    }

    /// Access the underlying models configuration.
    pub fn config(&self) -> &ModelsConfig {
        &self.config
    }

    /// Directory used for Hugging Face downloads.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    async fn load_classifier_internal(&self, name: &str) -> Result<Box<dyn Classifier>> {
        let config = self
            .config
            .get_model(name)
            .ok_or_else(|| Error::classifier(format!("Model '{}' not found in registry", name)))?;

        tracing::info!("Loading model '{}'", name);

        if let ModelSource::Builtin { implementation } = &config.source {
            return Ok(Box::new(LexiconClassifier::builtin(implementation)?));
        }

        let architecture = config.architecture.as_ref().ok_or_else(|| {
            Error::config(format!("Model '{}' has no architecture configured", name))
        })?;
        let model_path = self.resolve_model_path(config)?;
        let display_name = config.display_name(name).to_string();

        match architecture {
            ArchitectureConfig::BertSequenceClassification { num_labels, labels } => {
                load_bert_classifier(&model_path, config, display_name, *num_labels, labels)
            }
            ArchitectureConfig::DistilBertSequenceClassification { num_labels, labels } => {
                load_distilbert_classifier(&model_path, config, display_name, *num_labels, labels)
            }
        }
    }

    fn resolve_model_path(&self, config: &ModelConfig) -> Result<PathBuf> {
        match &config.source {
            ModelSource::Local { path } => {
                if !path.exists() {
                    return Err(Error::classifier(format!(
                        "Model path does not exist: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
            ModelSource::HuggingFace { repo, revision } => {
                self.download_from_huggingface(repo, revision)
            }
            ModelSource::Builtin { implementation } => Err(Error::classifier(format!(
                "Builtin implementation '{}' has no model files",
                implementation
            ))),
        }
    }

    fn download_from_huggingface(&self, repo: &str, revision: &str) -> Result<PathBuf> {
        tracing::info!("Fetching model from HuggingFace: {} @ {}", repo, revision);

        std::fs::create_dir_all(&self.cache_dir)?;
        let api = ApiBuilder::new()
            .with_cache_dir(self.cache_dir.clone())
            .with_progress(false)
            .build()
            .map_err(|e| {
                Error::classifier(format!("Failed to initialize HuggingFace API: {}", e))
            })?;

        let repo_obj = api.repo(Repo::with_revision(
            repo.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let config_path = repo_obj.get("config.json").map_err(|e| {
            Error::classifier(format!("Failed to download config.json for {}: {}", repo, e))
        })?;

        let weights = WEIGHT_FILES
            .iter()
            .find(|file| match repo_obj.get(file) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!("{} not available for {}: {}", file, repo, e);
                    false
                }
            })
            .ok_or_else(|| {
                Error::classifier(format!(
                    "No model weights found for {} (tried {})",
                    repo,
                    WEIGHT_FILES.join(", ")
                ))
            })?;
        tracing::debug!("Using weight file {}", weights);

        if !TOKENIZER_FILES.iter().any(|file| repo_obj.get(file).is_ok()) {
            return Err(Error::classifier(format!(
                "No tokenizer found for {} (tried {})",
                repo,
                TOKENIZER_FILES.join(", ")
            )));
        }

        let model_dir = config_path
            .parent()
            .ok_or_else(|| Error::classifier("Invalid cache path"))?;

        tracing::info!("Model available at: {}", model_dir.display());
        Ok(model_dir.to_path_buf())
    }
}

#[async_trait]
impl ModelLoaderPlugin for ExternalMlModelLoader {
    async fn load_classifier(&self, name: &str) -> Result<Box<dyn Classifier>> {
        self.load_classifier_internal(name).await
    }

    fn available_models(&self) -> Vec<String> {
        self.config.models.keys().cloned().collect()
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marinetext/models")
}

fn candle_err(context: &'static str) -> impl Fn(candle_core::Error) -> Error {
    move |e| Error::classifier(format!("{}: {}", context, e))
}

fn get_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0).map_err(candle_err("Failed to initialize CUDA")),
        "mps" | "metal" => Device::new_metal(0).map_err(candle_err("Failed to initialize Metal")),
        _ => Ok(Device::Cpu),
    }
}

fn parse_json_config<T: DeserializeOwned>(config_path: &Path) -> Result<T> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::classifier(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::classifier(format!(
            "Failed to parse config {}: {}",
            config_path.display(),
            e
        ))
    })
}

#[derive(Debug, Default, Deserialize)]
struct LabelMapping {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Resolve label names: configured labels first, then the model's
/// `id2label`, then `LABEL_{idx}`.
fn resolve_labels(
    num_labels: usize,
    configured: &[String],
    id2label: &HashMap<String, String>,
) -> Vec<String> {
    (0..num_labels.max(configured.len()))
        .map(|idx| {
            configured
                .get(idx)
                .or_else(|| id2label.get(&idx.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{}", idx))
        })
        .collect()
}

fn labels_for_model(model_path: &Path, num_labels: usize, configured: &[String]) -> Vec<String> {
    let mapping = if configured.len() >= num_labels {
        LabelMapping::default()
    } else {
        parse_json_config::<LabelMapping>(&model_path.join("config.json")).unwrap_or_else(|e| {
            tracing::warn!("No id2label available: {}", e);
            LabelMapping::default()
        })
    };
    resolve_labels(num_labels, configured, &mapping.id2label)
}

fn load_var_builder(model_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_path.join(WEIGHT_FILES[0]);
    if safetensors.exists() {
        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)
                .map_err(candle_err("Failed to load safetensors weights"))?
        };
        return Ok(vb);
    }

    let pytorch = model_path.join(WEIGHT_FILES[1]);
    if pytorch.exists() {
        return VarBuilder::from_pth(&pytorch, DType::F32, device)
            .map_err(candle_err("Failed to load PyTorch weights"));
    }

    Err(Error::classifier(format!(
        "No weights found in {} (tried {})",
        model_path.display(),
        WEIGHT_FILES.join(", ")
    )))
}

fn load_tokenizer(model_path: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_path.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(|e| Error::classifier(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_path.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;
        use tokenizers::Model;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::classifier(format!("Failed to build WordPiece model: {}", e)))?;

        let sep_id = wordpiece.token_to_id("[SEP]").unwrap_or(102);
        let cls_id = wordpiece.token_to_id("[CLS]").unwrap_or(101);

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep_id),
            ("[CLS]".to_string(), cls_id),
        )));

        return Ok(tokenizer);
    }

    Err(Error::classifier(format!(
        "No tokenizer found in {} (tried {})",
        model_path.display(),
        TOKENIZER_FILES.join(", ")
    )))
}

/// Try the usual weight prefixes; returns the model and the prefix that worked.
fn load_bert_backbone(vb: &VarBuilder, config: &BertConfig) -> Result<(BertModel, String)> {
    let mut errors = Vec::new();

    for prefix in ["bert", "roberta", ""] {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(prefix)
        };

        match BertModel::load(vb_prefix, config) {
            Ok(model) => {
                tracing::info!(
                    "Loaded BERT backbone from '{}'",
                    if prefix.is_empty() { "<root>" } else { prefix }
                );
                return Ok((model, prefix.to_string()));
            }
            Err(e) => errors.push(format!(
                "{}: {}",
                if prefix.is_empty() { "<root>" } else { prefix },
                e
            )),
        }
    }

    Err(Error::classifier(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

fn load_classification_head(vb: &VarBuilder, hidden_size: usize, num_labels: usize) -> Result<Linear> {
    let mut errors = Vec::new();

    for prefix in ["classifier", "score"] {
        match candle_nn::linear(hidden_size, num_labels, vb.pp(prefix)) {
            Ok(linear) => {
                tracing::info!(
                    "Loaded classification head from '{}' (hidden_size={}, num_labels={})",
                    prefix,
                    hidden_size,
                    num_labels
                );
                return Ok(linear);
            }
            Err(e) => errors.push(format!("{}: {}", prefix, e)),
        }
    }

    Err(Error::classifier(format!(
        "No classification head found [{}]",
        errors.join(" | ")
    )))
}

fn to_probabilities(logits: &Tensor) -> Result<Vec<f32>> {
    candle_nn::ops::softmax(logits, D::Minus1)
        .map_err(candle_err("Softmax failed"))?
        .squeeze(0)
        .map_err(candle_err("Squeeze failed"))?
        .to_vec1()
        .map_err(candle_err("Failed to convert to vec"))
}

fn row_tensor(values: &[u32], device: &Device, what: &'static str) -> Result<Tensor> {
    Tensor::new(values, device)
        .map_err(candle_err(what))?
        .unsqueeze(0)
        .map_err(candle_err("Failed to unsqueeze"))
}

/// Truncate inside the tokenizer so `[CLS]`/`[SEP]` survive long inputs.
fn with_max_length(mut tokenizer: Tokenizer, max_length: usize) -> Result<Tokenizer> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::classifier(format!("Failed to configure truncation: {}", e)))?;
    Ok(tokenizer)
}

fn encode(tokenizer: &Tokenizer, text: &str) -> Result<tokenizers::Encoding> {
    tokenizer
        .encode(text, true)
        .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))
}

fn load_bert_classifier(
    model_path: &Path,
    config: &ModelConfig,
    name: String,
    num_labels: usize,
    labels: &[String],
) -> Result<Box<dyn Classifier>> {
    let tokenizer = with_max_length(load_tokenizer(model_path)?, config.inference.max_length)?;
    let bert_config: BertConfig = parse_json_config(&model_path.join("config.json"))?;

    let device = get_device(&config.inference.device)?;
    let vb = load_var_builder(model_path, &device)?;

    let (model, prefix) = load_bert_backbone(&vb, &bert_config)?;
    let pooler_vb = if prefix.is_empty() {
        vb.pp("pooler").pp("dense")
    } else {
        vb.pp(&prefix).pp("pooler").pp("dense")
    };
    let pooler = candle_nn::linear(bert_config.hidden_size, bert_config.hidden_size, pooler_vb).ok();
    if pooler.is_none() {
        tracing::warn!("No pooler weights for '{}'; classifying the raw [CLS] state", name);
    }

    let classifier = load_classification_head(&vb, bert_config.hidden_size, num_labels)?;
    let labels = labels_for_model(model_path, num_labels, labels);

    tracing::info!(
        "Successfully loaded BERT classifier '{}' with labels {:?}",
        name,
        labels
    );

    Ok(Box::new(BertSequenceClassifier {
        name,
        tokenizer,
        model,
        pooler,
        classifier,
        device,
        labels,
    }))
}

fn load_distilbert_classifier(
    model_path: &Path,
    config: &ModelConfig,
    name: String,
    num_labels: usize,
    labels: &[String],
) -> Result<Box<dyn Classifier>> {
    let tokenizer = with_max_length(load_tokenizer(model_path)?, config.inference.max_length)?;

    let config_json: serde_json::Value = parse_json_config(&model_path.join("config.json"))?;
    let hidden_size = config_json
        .get("dim")
        .or_else(|| config_json.get("hidden_size"))
        .and_then(|v| v.as_u64())
        .unwrap_or(768) as usize;
    let distilbert_config: DistilBertConfig = serde_json::from_value(config_json)?;

    let device = get_device(&config.inference.device)?;
    let vb = load_var_builder(model_path, &device)?;

    let model = DistilBertModel::load(vb.pp("distilbert"), &distilbert_config)
        .map_err(candle_err("Failed to load DistilBERT model"))?;

    let pre_classifier = candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier")).ok();
    if pre_classifier.is_some() {
        tracing::debug!("Loaded pre_classifier layer (hidden_size={})", hidden_size);
    }

    let classifier = load_classification_head(&vb, hidden_size, num_labels)?;
    let labels = labels_for_model(model_path, num_labels, labels);

    tracing::info!(
        "Successfully loaded DistilBERT classifier '{}' with labels {:?}",
        name,
        labels
    );

    Ok(Box::new(DistilBertSequenceClassifier {
        name,
        tokenizer,
        model,
        pre_classifier,
        classifier,
        device,
        labels,
    }))
}

struct BertSequenceClassifier {
    name: String,
    tokenizer: Tokenizer,
    model: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
}

#[async_trait]
impl Classifier for BertSequenceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<ClassificationResult>> {
        let start = Instant::now();

        let encoding = encode(&self.tokenizer, text)?;
        let input_ids = row_tensor(encoding.get_ids(), &self.device, "Failed to create input tensor")?;
        let token_type_ids = row_tensor(
            encoding.get_type_ids(),
            &self.device,
            "Failed to create token type tensor",
        )?;

        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, None)
            .map_err(candle_err("Model forward pass failed"))?;

        let cls_embedding = hidden_states
            .i((0, 0, ..))
            .map_err(candle_err("Failed to get CLS token"))?
            .unsqueeze(0)
            .map_err(candle_err("Failed to unsqueeze CLS"))?;

        let pooled = match &self.pooler {
            Some(pooler) => pooler
                .forward(&cls_embedding)
                .map_err(candle_err("Pooler failed"))?
                .tanh()
                .map_err(candle_err("Tanh failed"))?,
            None => cls_embedding,
        };

        let logits = self
            .classifier
            .forward(&pooled)
            .map_err(candle_err("Classification head failed"))?;

        let probs = to_probabilities(&logits)?;

        Ok(rank_scores(
            &self.labels,
            &probs,
            &self.name,
            start.elapsed().as_micros() as u64,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct DistilBertSequenceClassifier {
    name: String,
    tokenizer: Tokenizer,
    model: DistilBertModel,
    pre_classifier: Option<Linear>,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
}

#[async_trait]
impl Classifier for DistilBertSequenceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<ClassificationResult>> {
        let start = Instant::now();

        let encoding = encode(&self.tokenizer, text)?;

        let input_ids_i64: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let input_ids = Tensor::new(input_ids_i64.as_slice(), &self.device)
            .map_err(candle_err("Failed to create input tensor"))?
            .unsqueeze(0)
            .map_err(candle_err("Failed to unsqueeze"))?;

        // DistilBERT masks positions where the mask is 1, so padding is flagged.
        let padding_mask: Vec<u8> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| u8::from(x == 0))
            .collect();
        let attention_mask = Tensor::new(padding_mask.as_slice(), &self.device)
            .map_err(candle_err("Failed to create attention mask"))?
            .unsqueeze(0)
            .map_err(candle_err("Failed to unsqueeze"))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &attention_mask)
            .map_err(candle_err("Model forward pass failed"))?;

        let cls_embedding = hidden_states
            .i((0, 0, ..))
            .map_err(candle_err("Failed to get CLS token"))?
            .unsqueeze(0)
            .map_err(candle_err("Failed to unsqueeze CLS"))?;

        let pooled = match &self.pre_classifier {
            Some(pre_classifier) => pre_classifier
                .forward(&cls_embedding)
                .map_err(candle_err("Pre-classifier failed"))?
                .relu()
                .map_err(candle_err("ReLU failed"))?,
            None => cls_embedding,
        };

        let logits = self
            .classifier
            .forward(&pooled)
            .map_err(candle_err("Classification head failed"))?;

        let probs = to_probabilities(&logits)?;

        Ok(rank_scores(
            &self.labels,
            &probs,
            &self.name,
            start.elapsed().as_micros() as u64,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
