use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Word tables and tunable constants driving the analysis pipeline and the
/// aggregate views. Defaults are compiled in; a deployment can override them
/// from a config directory.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub config: AnalysisConfig,
    pub stopwords: Vec<String>,
    pub positive_markers: Vec<String>,
    pub negative_markers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub summary_cap: usize,
    pub max_keywords: usize,
    pub keyword_weight: usize, // word-cloud weight of a curated keyword vs 1 per summary token
    pub topic_limit: usize,
    pub cloud_limit: usize,
    pub default_keywords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            summary_cap: 100,
            max_keywords: 5,
            keyword_weight: 3,
            topic_limit: 10,
            cloud_limit: 50,
            default_keywords: vec![
                "consultation".to_string(),
                "feedback".to_string(),
                "policy".to_string(),
            ],
        }
    }
}

const DEFAULT_STOPWORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "can", "a", "an", "this", "that", "these", "those",
];

const DEFAULT_POSITIVE_MARKERS: &[&str] = &[
    "good", "great", "excellent", "improve", "support", "benefit", "help", "appreciate",
    "welcome", "love", "clean", "safe", "thank",
];

const DEFAULT_NEGATIVE_MARKERS: &[&str] = &[
    "bad", "poor", "worse", "worst", "problem", "issue", "fail", "delay", "concern",
    "complain", "corrupt", "unsafe", "dirty", "lack",
];

#[derive(Debug, Clone, Deserialize)]
struct StopwordsFile {
    words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MarkersFile {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            stopwords: to_owned_list(DEFAULT_STOPWORDS),
            positive_markers: to_owned_list(DEFAULT_POSITIVE_MARKERS),
            negative_markers: to_owned_list(DEFAULT_NEGATIVE_MARKERS),
        }
    }
}

impl Lexicon {
    /// Load the full table set from a config directory:
    /// `analysis_config.toml`, `stopwords.yaml`, `sentiment_markers.yaml`.
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path.join("analysis_config.toml"))?;
        let config = parse_config(&config_str)?;

        let stopwords_str = fs::read_to_string(path.join("stopwords.yaml"))?;
        let stopwords = parse_stopwords(&stopwords_str)?;

        let markers_str = fs::read_to_string(path.join("sentiment_markers.yaml"))?;
        let markers = parse_markers(&markers_str)?;

        Ok(Self {
            config,
            stopwords,
            positive_markers: markers.positive,
            negative_markers: markers.negative,
        })
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.iter().any(|word| word == token)
    }
}

fn parse_config(raw: &str) -> Result<AnalysisConfig> {
    Ok(toml::from_str(raw)?)
}

fn parse_stopwords(raw: &str) -> Result<Vec<String>> {
    let file: StopwordsFile = serde_yaml::from_str(raw)?;
    Ok(lowercased(file.words))
}

fn parse_markers(raw: &str) -> Result<MarkersFile> {
    let file: MarkersFile = serde_yaml::from_str(raw)?;
    Ok(MarkersFile {
        positive: lowercased(file.positive),
        negative: lowercased(file.negative),
    })
}

fn lowercased(words: Vec<String>) -> Vec<String> {
    words.into_iter().map(|word| word.to_lowercase()).collect()
}

fn to_owned_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}
