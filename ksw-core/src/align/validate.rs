use log::debug;

use super::types::{AlignmentParams, BackendKind, Mode};
use crate::error::{KswError, KswResult};

/// Proof that a (mode, backend, params) combination passed [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedConfig {
    mode: Mode,
    backend: BackendKind,
    params: AlignmentParams,
}

impl ValidatedConfig {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn params(&self) -> &AlignmentParams {
        &self.params
    }
}

// Keeps every DP cell of realistic inputs inside i32.
const MAX_PENALTY: i32 = i16::MAX as i32;

fn require(
    ok: bool,
    name: &'static str,
    flag: &'static str,
    requirement: &'static str,
    value: i32,
) -> KswResult<()> {
    if ok {
        Ok(())
    } else {
        Err(KswError::InvalidParameter {
            name,
            flag,
            requirement,
            value,
        })
    }
}

/// Checks the raw mode number, the optional backend name and every
/// parameter. With no backend named, the mode picks one.
pub fn validate(
    mode: i32,
    backend: Option<&str>,
    params: AlignmentParams,
) -> KswResult<ValidatedConfig> {
    let mode = Mode::try_from(mode)?;
    let backend = match backend {
        Some(name) => name.parse::<BackendKind>()?,
        None => BackendKind::default_for(mode),
    };

    let p = &params;
    require(
        (1..=i8::MAX as i32).contains(&p.match_score),
        "Match score",
        "-a",
        "in [1, 127]",
        p.match_score,
    )?;
    require(
        (1..=i8::MAX as i32).contains(&p.mismatch),
        "Mismatch penalty",
        "-b",
        "in [1, 127]",
        p.mismatch,
    )?;
    match backend {
        BackendKind::Banded => require(
            (0..=MAX_PENALTY).contains(&p.gap_open),
            "Gap open penalty",
            "-q",
            "in [0, 32767]",
            p.gap_open,
        )?,
        BackendKind::Vectorized => require(
            (1..=MAX_PENALTY).contains(&p.gap_open),
            "Gap open penalty",
            "-q",
            "in [1, 32767] for the vectorized backend",
            p.gap_open,
        )?,
    }
    require(
        (1..=MAX_PENALTY).contains(&p.gap_extend),
        "Gap extend penalty",
        "-r",
        "in [1, 32767]",
        p.gap_extend,
    )?;
    require(
        p.band_width >= 0,
        "Band width",
        "-w",
        "non-negative",
        p.band_width,
    )?;
    require(
        (0..=MAX_PENALTY).contains(&p.start_score),
        "Start score",
        "-0",
        "in [0, 32767]",
        p.start_score,
    )?;

    if !backend.supports(mode) {
        return Err(KswError::UnsupportedMode { mode, backend });
    }

    if backend != BackendKind::Banded {
        if p.right_align_gaps {
            return Err(KswError::BandedOnly {
                name: "Right-aligning gaps",
                flag: "-R",
                backend,
            });
        }
        if p.zdrop.is_some() {
            return Err(KswError::BandedOnly {
                name: "Z-drop",
                flag: "-z",
                backend,
            });
        }
    }
    if let Some(zdrop) = p.zdrop {
        require(zdrop >= 0, "Z-drop", "-z", "non-negative", zdrop)?;
    }

    debug!("validated mode {} with {} backend", mode, backend);
    Ok(ValidatedConfig {
        mode,
        backend,
        params,
    })
}
