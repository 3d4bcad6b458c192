use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_TOKEN_URIS;
use crate::ipfs::IpfsPinner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAttribute {
    pub trait_type: String,
    pub value: u64,
}

/// Per-token metadata document. A template instance is cloned for every
/// image, with `name`, `description` and `image` overwritten; the document
/// itself only lives until its pin is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<TokenAttribute>,
}

pub fn pup_template() -> TokenMetadata {
    TokenMetadata {
        name: String::new(),
        description: String::new(),
        image: String::new(),
        attributes: vec![TokenAttribute {
            trait_type: "Cuteness".to_owned(),
            value: 100,
        }],
    }
}

pub fn fallback_token_uris() -> Vec<String> {
    FALLBACK_TOKEN_URIS.iter().map(|uri| uri.to_string()).collect()
}

/// Builds the metadata document for one pinned image. The display name is
/// the file name with its extension stripped.
pub fn metadata_for_image(
    template: &TokenMetadata,
    image_path: &Path,
    image_hash: &str,
) -> TokenMetadata {
    let name = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut metadata = template.clone();
    metadata.description = format!("An adorable {name} pup!");
    metadata.image = format!("ipfs://{image_hash}");
    metadata.name = name;
    metadata
}

pub fn list_images(image_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(image_dir)
        .with_context(|| format!("Failed to list image directory {}", image_dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() {
            images.push(path);
        }
    }
    // The contract indexes token metadata by position; directory listing
    // order is not stable across filesystems.
    images.sort();
    Ok(images)
}

/// Produces one `ipfs://` token URI per image in `image_dir`, in filename
/// order. With upload disabled the fixed fallback list is returned and
/// neither the pinner nor the directory is touched.
///
/// Uploads run strictly one after another; the first failure aborts the
/// whole build with no partial result.
pub async fn build_token_uris(
    upload_enabled: bool,
    pinner: &impl IpfsPinner,
    image_dir: &Path,
    template: &TokenMetadata,
) -> anyhow::Result<Vec<String>> {
    if !upload_enabled {
        return Ok(fallback_token_uris());
    }

    let images = list_images(image_dir)?;
    tracing::info!("Uploading {} images from {}", images.len(), image_dir.display());

    let mut token_uris = Vec::with_capacity(images.len());
    for image in &images {
        let image_pin = pinner.pin_file(image).await?;
        let metadata = metadata_for_image(template, image, &image_pin.ipfs_hash);

        tracing::info!("Uploading metadata for {}...", metadata.name);
        let metadata_json = serde_json::to_value(&metadata)?;
        let metadata_pin = pinner.pin_json(&metadata.name, &metadata_json).await?;
        token_uris.push(format!("ipfs://{}", metadata_pin.ipfs_hash));
    }

    tracing::info!("Token URIs uploaded: {token_uris:?}");
    Ok(token_uris)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_for_pug_image() {
        let template = pup_template();
        let metadata = metadata_for_image(&template, Path::new("images/pug.png"), "QmImageHash");

        assert_eq!(metadata.name, "pug");
        assert_eq!(metadata.description, "An adorable pug pup!");
        assert_eq!(metadata.image, "ipfs://QmImageHash");
        assert_eq!(metadata.attributes, template.attributes);
    }

    #[test]
    fn template_is_not_mutated() {
        let template = pup_template();
        let _ = metadata_for_image(&template, Path::new("shiba-inu.png"), "QmHash");

        assert!(template.name.is_empty());
        assert!(template.description.is_empty());
        assert!(template.image.is_empty());
    }

    #[test]
    fn extension_is_stripped_only_once() {
        let metadata = metadata_for_image(&pup_template(), Path::new("st.bernard.png"), "Qm");
        assert_eq!(metadata.name, "st.bernard");
    }

    #[test]
    fn fallback_list_is_fixed() {
        let uris = fallback_token_uris();
        assert_eq!(uris.len(), 3);
        assert_eq!(uris[0], "ipfs://QmaVkBn2tKmjbhphU7eyztbvSQU5EXDdqRyXZtRhSGgJGo");
        assert_eq!(uris[1], "ipfs://QmYQC5aGZu2PTH8XzbJrbDnvhj3gVs7ya33H9mqUNvST3d");
        assert_eq!(uris[2], "ipfs://QmZYmH5iDbD6v3U2ixoVAjioSzvWJszDzYdbeCLquGSpVm");
    }

    #[test]
    fn attributes_serialize_with_trait_type_key() {
        let value = serde_json::to_value(pup_template()).unwrap();
        assert_eq!(value["attributes"][0]["trait_type"], "Cuteness");
        assert_eq!(value["attributes"][0]["value"], 100);
    }
}
