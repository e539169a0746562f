use super::encryption::KdfParams;
use crate::errors::CoreError;

/// Magic bytes identifying an encrypted finance dashboard (FNDB) file.
pub const MAGIC: &[u8; 4] = b"FNDB";

/// Current on-disk format version.
pub const CURRENT_VERSION: u16 = 1;

/// Fixed header size in bytes:
/// magic(4) + version(2) + kdf params(12) + salt(16) + nonce(12) + ciphertext_len(8)
pub const HEADER_SIZE: usize = 54;

/// Parsed header of an FNDB file.
#[derive(Debug)]
pub struct FileHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext_len: u64,
}

/// Assemble a complete file image from its parts.
///
/// Layout (all integers little-endian):
/// ```text
/// [FNDB: 4B] [version: 2B] [memory_cost: 4B] [time_cost: 4B]
/// [parallelism: 4B] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B]
/// [ciphertext + GCM tag: variable]
/// ```
pub fn write_file(
    version: u16,
    kdf_params: &KdfParams,
    salt: &[u8; 16],
    nonce: &[u8; 12],
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(ciphertext);

    buf
}

fn read_u32(data: &[u8], offset: usize, what: &str) -> Result<u32, CoreError> {
    data[offset..offset + 4]
        .try_into()
        .map(u32::from_le_bytes)
        .map_err(|_| CoreError::InvalidFileFormat(format!("Failed to read {what}")))
}

/// Parse and validate the header, returning it together with the
/// ciphertext slice it frames.
pub fn read_file(data: &[u8]) -> Result<(FileHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid FNDB file".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes, not an FNDB file".into(),
        ));
    }

    let mut offset = 4;

    let version = u16::from_le_bytes([data[offset], data[offset + 1]]);
    offset += 2;
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: read_u32(data, offset, "KDF memory_cost")?,
        time_cost: read_u32(data, offset + 4, "KDF time_cost")?,
        parallelism: read_u32(data, offset + 8, "KDF parallelism")?,
    };
    offset += 12;
    kdf_params.validate()?;

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[offset..offset + 16]);
    offset += 16;

    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[offset..offset + 12]);
    offset += 12;

    let ciphertext_len = u64::from_le_bytes(
        data[offset..offset + 8]
            .try_into()
            .map_err(|_| CoreError::InvalidFileFormat("Failed to read ciphertext length".into()))?,
    );
    offset += 8;

    // The length field is attacker-controlled; compare without casting so
    // an absurd value can never overflow the slice arithmetic.
    let remaining = (data.len() - offset) as u64;
    if ciphertext_len > remaining {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: expected {ciphertext_len} bytes of ciphertext, got {remaining}"
        )));
    }

    let header = FileHeader {
        version,
        kdf_params,
        salt,
        nonce,
        ciphertext_len,
    };

    Ok((header, &data[offset..offset + ciphertext_len as usize]))
}
