pub mod audio;
pub mod config;
pub mod error;
pub mod lipsync;
pub mod pipeline;
pub mod types;

pub use audio::{AudioSource, DecodedAudio};
pub use config::VisemeConfig;
pub use error::{ErrorBody, VisemeError};
pub use lipsync::selector::TieBreakStrategy;
pub use pipeline::builder::VisemeGeneratorBuilder;
pub use pipeline::runtime::VisemeGenerator;
pub use pipeline::traits::{AudioAnalyzer, PhonemeAligner, PhonemeConverter};
pub use types::{
    AlignedPhoneme, AudioAnalysis, GenerationInput, GenerationRequest, GenerationResponse,
    PhonemeToken, Viseme, VisemeEvent, VisemeSequence,
};
