//! Asset generation: the seam between the editor and an image generation
//! backend, plus the session gate in front of it.
//!
//! The editor never talks to a backend directly. It builds a
//! [`GenerationRequest`], checks the [`AuthSession`], and hands the request
//! to whatever [`AssetGenerator`] the host wired in.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Document;
use crate::error::{DesignError, DesignResult};
use crate::layer::LayerId;

/// A selectable generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageModel {
    /// Stable identifier sent to the backend.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short marketing description.
    pub description: &'static str,
    /// Credit cost per generation.
    pub credits: u32,
    /// Rough latency class.
    pub speed: &'static str,
    /// Rough output quality class.
    pub quality: &'static str,
}

/// The model catalog offered in the generation panel.
pub const IMAGE_MODELS: [ImageModel; 4] = [
    ImageModel {
        id: "flux-pro",
        name: "Flux Pro",
        description: "State-of-the-art image generation",
        credits: 25,
        speed: "Fast",
        quality: "Excellent",
    },
    ImageModel {
        id: "midjourney-v6",
        name: "Midjourney V6",
        description: "Artistic and creative outputs",
        credits: 15,
        speed: "Medium",
        quality: "Excellent",
    },
    ImageModel {
        id: "dall-e-3",
        name: "DALL-E 3",
        description: "Reliable and consistent results",
        credits: 20,
        speed: "Medium",
        quality: "Very Good",
    },
    ImageModel {
        id: "stable-diffusion-xl",
        name: "Stable Diffusion XL",
        description: "Open source powerhouse",
        credits: 10,
        speed: "Fast",
        quality: "Good",
    },
];

/// Look up a model by its stable id.
#[must_use]
pub fn model_by_id(id: &str) -> Option<&'static ImageModel> {
    IMAGE_MODELS.iter().find(|m| m.id == id)
}

/// A generation request built from the prompt panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The user's prompt.
    pub prompt: String,
    /// Model id from [`IMAGE_MODELS`].
    pub model: String,
    /// Requested output width in pixels.
    pub width: u32,
    /// Requested output height in pixels.
    pub height: u32,
}

/// A generated asset reference returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAsset {
    /// Where the asset can be loaded from (URL, path, or `data:` URI).
    pub url: String,
}

/// A backend that can turn prompts into assets.
pub trait AssetGenerator {
    /// Generate an asset for the request.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Generation`] when the backend fails.
    fn generate(&self, request: &GenerationRequest) -> DesignResult<GeneratedAsset>;
}

/// The identity state the host passes in with each generation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    /// Whether a user is signed in.
    pub authenticated: bool,
    /// Bearer token for the backend, when signed in.
    pub token: Option<String>,
}

impl AuthSession {
    /// A signed-in session carrying a token.
    #[must_use]
    pub fn signed_in(token: &str) -> Self {
        Self {
            authenticated: true,
            token: Some(token.to_string()),
        }
    }
}

/// Generate an asset and insert it as a new image layer.
///
/// The new layer is named after a truncated form of the prompt and becomes
/// the selection, like any other layer insertion.
///
/// # Errors
///
/// Returns [`DesignError::Unauthenticated`] when no user is signed in, or
/// [`DesignError::Generation`] when the backend fails.
#[allow(clippy::cast_precision_loss)]
pub fn generate_layer(
    doc: &mut Document,
    session: &AuthSession,
    generator: &dyn AssetGenerator,
    request: &GenerationRequest,
) -> DesignResult<LayerId> {
    if !session.authenticated {
        return Err(DesignError::Unauthenticated);
    }
    let asset = generator.generate(request)?;
    info!(model = %request.model, url = %asset.url, "generated asset");

    let mut name: String = format!("AI: {}", request.prompt);
    if name.chars().count() > 30 {
        name = name.chars().take(30).collect();
        name.push('…');
    }
    let mut layer = crate::layer::Layer::image(&name, Some(asset.url));
    layer.width = request.width.min(400) as f32;
    layer.height = request.height.min(400) as f32;
    Ok(doc.add_layer(layer))
}

/// Deterministic generator for tests and offline demos. Produces a fake
/// asset URL derived from the request instead of calling a service.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl AssetGenerator for MockGenerator {
    fn generate(&self, request: &GenerationRequest) -> DesignResult<GeneratedAsset> {
        if model_by_id(&request.model).is_none() {
            return Err(DesignError::Generation(format!(
                "unknown model: {}",
                request.model
            )));
        }
        Ok(GeneratedAsset {
            url: format!(
                "https://assets.invalid/{}/{}x{}.png",
                request.model, request.width, request.height
            ),
        })
    }
}
