//! Signed data items accepted by Bundlr nodes (ANS-104)
//!
//! Layout: signature type, signature, owner, optional target, optional
//! anchor, tag count, tag byte length, Avro encoded tags, data. The signature
//! covers the SHA-384 deep hash of every field except itself.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256, Sha384};
use solana_sdk::{
    signature::{Keypair, Signature},
    signer::Signer,
};

use crate::error::{SdkError, SdkResult};

/// Signature type of ed25519 (Solana) owners
pub const ED25519_SIGNATURE_TYPE: u16 = 2;

const SIGNATURE_LENGTH: usize = 64;
const OWNER_LENGTH: usize = 32;

/// Name/value pair attached to a data item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Data item signed by a Solana keypair
#[derive(Clone, Debug)]
pub struct DataItem {
    signature: Signature,
    owner: [u8; OWNER_LENGTH],
    target: Option<[u8; 32]>,
    anchor: Option<[u8; 32]>,
    tags: Vec<Tag>,
    data: Vec<u8>,
}

impl DataItem {
    /// Build and sign a data item over `data`
    pub fn sign(
        signer: &Keypair,
        data: Vec<u8>,
        tags: Vec<Tag>,
        anchor: Option<[u8; 32]>,
    ) -> SdkResult<Self> {
        let mut item = Self {
            signature: Signature::default(),
            owner: signer.pubkey().to_bytes(),
            target: None,
            anchor,
            tags,
            data,
        };
        let message = item.signature_message()?;
        item.signature = signer.sign_message(&message);
        Ok(item)
    }

    /// Transaction id: base64url of the SHA-256 of the signature
    pub fn id(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.signature.as_ref()))
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn owner(&self) -> &[u8; OWNER_LENGTH] {
        &self.owner
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Deep hash signed by the owner
    pub fn signature_message(&self) -> SdkResult<Vec<u8>> {
        let tags = encode_tags(&self.tags)?;
        let signature_type = ED25519_SIGNATURE_TYPE.to_string();
        let target = self.target.as_ref().map_or(&[][..], |t| &t[..]);
        let anchor = self.anchor.as_ref().map_or(&[][..], |a| &a[..]);

        Ok(deep_hash(&DeepHashChunk::List(vec![
            DeepHashChunk::Blob(b"dataitem"),
            DeepHashChunk::Blob(b"1"),
            DeepHashChunk::Blob(signature_type.as_bytes()),
            DeepHashChunk::Blob(&self.owner),
            DeepHashChunk::Blob(target),
            DeepHashChunk::Blob(anchor),
            DeepHashChunk::Blob(&tags),
            DeepHashChunk::Blob(&self.data),
        ])))
    }

    /// Check the signature against the owner key
    pub fn verify(&self) -> SdkResult<bool> {
        let message = self.signature_message()?;
        Ok(self.signature.verify(&self.owner, &message))
    }

    /// Binary form posted to the node
    pub fn to_bytes(&self) -> SdkResult<Vec<u8>> {
        let tags = encode_tags(&self.tags)?;
        let mut out = Vec::with_capacity(
            2 + SIGNATURE_LENGTH + OWNER_LENGTH + 2 + 64 + 16 + tags.len() + self.data.len(),
        );

        out.extend_from_slice(&ED25519_SIGNATURE_TYPE.to_le_bytes());
        out.extend_from_slice(self.signature.as_ref());
        out.extend_from_slice(&self.owner);
        push_optional(&mut out, self.target.as_ref());
        push_optional(&mut out, self.anchor.as_ref());
        out.extend_from_slice(&(self.tags.len() as u64).to_le_bytes());
        out.extend_from_slice(&(tags.len() as u64).to_le_bytes());
        out.extend_from_slice(&tags);
        out.extend_from_slice(&self.data);

        Ok(out)
    }
}

fn push_optional(out: &mut Vec<u8>, value: Option<&[u8; 32]>) {
    match value {
        Some(bytes) => {
            out.push(1);
            out.extend_from_slice(bytes);
        }
        None => out.push(0),
    }
}

/// Input to [`deep_hash`]
pub enum DeepHashChunk<'a> {
    Blob(&'a [u8]),
    List(Vec<DeepHashChunk<'a>>),
}

/// Arweave deep hash over nested byte lists
pub fn deep_hash(chunk: &DeepHashChunk<'_>) -> Vec<u8> {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag = Sha384::digest(format!("blob{}", data.len()).as_bytes());
            let data = Sha384::digest(data);
            let mut hasher = Sha384::new();
            hasher.update(tag);
            hasher.update(data);
            hasher.finalize().to_vec()
        }
        DeepHashChunk::List(chunks) => {
            let mut acc = Sha384::digest(format!("list{}", chunks.len()).as_bytes()).to_vec();
            for chunk in chunks {
                let mut hasher = Sha384::new();
                hasher.update(&acc);
                hasher.update(deep_hash(chunk));
                acc = hasher.finalize().to_vec();
            }
            acc
        }
    }
}

/// Avro encoding of `array<record { name: bytes, value: bytes }>`
///
/// An empty tag list encodes to no bytes at all.
pub fn encode_tags(tags: &[Tag]) -> SdkResult<Vec<u8>> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    write_long(&mut out, tag_len(tags.len())?);
    for tag in tags {
        if tag.name.is_empty() || tag.value.is_empty() {
            return Err(SdkError::InvalidParameters(
                "data item tags need a non-empty name and value".to_string(),
            ));
        }
        write_bytes(&mut out, tag.name.as_bytes())?;
        write_bytes(&mut out, tag.value.as_bytes())?;
    }
    write_long(&mut out, 0);
    Ok(out)
}

fn tag_len(len: usize) -> SdkResult<i64> {
    i64::try_from(len).map_err(|_| SdkError::MathOverflow)
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> SdkResult<()> {
    write_long(out, tag_len(bytes.len())?);
    out.extend_from_slice(bytes);
    Ok(())
}

// Zigzag varint
fn write_long(out: &mut Vec<u8>, value: i64) {
    let mut n = ((value << 1) ^ (value >> 63)) as u64;
    while n >= 0x80 {
        out.push((n as u8 & 0x7f) | 0x80);
        n >>= 7;
    }
    out.push(n as u8);
}
