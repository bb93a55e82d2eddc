//! Etiquetas de tejido y aritmética de vóxeles.
//!
//! Cada etiqueta se obtiene restando dos volúmenes llenos y multiplicando por
//! su código. Con máscaras binarias anidadas
//! (`csf_outer ⊇ gm_outer ⊇ gm_inner ⊇ wm_boundary`) las tres bandas son
//! disjuntas y su suma es un rim con códigos 0..=3. Las máscaras binarias son
//! precondición del contrato; no se verifican.
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::surface::SurfaceRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TissueLabel {
    Csf,
    WhiteMatter,
    GrayMatter,
}

impl TissueLabel {
    pub const ALL: [TissueLabel; 3] = [TissueLabel::Csf, TissueLabel::WhiteMatter, TissueLabel::GrayMatter];

    /// Código del vóxel en el rim.
    pub fn code(self) -> i32 {
        match self {
            TissueLabel::Csf => 1,
            TissueLabel::WhiteMatter => 2,
            TissueLabel::GrayMatter => 3,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            TissueLabel::Csf => "csf",
            TissueLabel::WhiteMatter => "wm",
            TissueLabel::GrayMatter => "gm",
        }
    }

    /// `(minuendo, sustraendo)` de la resta de volúmenes llenos.
    pub fn operands(self) -> (SurfaceRole, SurfaceRole) {
        match self {
            TissueLabel::Csf => (SurfaceRole::CsfOuter, SurfaceRole::GmOuter),
            TissueLabel::WhiteMatter => (SurfaceRole::GmInner, SurfaceRole::WmBoundary),
            TissueLabel::GrayMatter => (SurfaceRole::GmOuter, SurfaceRole::GmInner),
        }
    }

    pub fn expr(self) -> VoxelExpr {
        VoxelExpr { op: VoxelOp::Sub,
                    scale: Some(self.code()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoxelOp {
    Sub,
    Add,
}

impl VoxelOp {
    pub fn keyword(self) -> &'static str {
        match self {
            VoxelOp::Sub => "sub",
            VoxelOp::Add => "add",
        }
    }

    pub fn from_keyword(word: &str) -> Option<VoxelOp> {
        match word {
            "sub" => Some(VoxelOp::Sub),
            "add" => Some(VoxelOp::Add),
            _ => None,
        }
    }
}

/// `(a op b) * scale`, vóxel a vóxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelExpr {
    pub op: VoxelOp,
    pub scale: Option<i32>,
}

impl VoxelExpr {
    pub fn sum() -> Self {
        Self { op: VoxelOp::Add,
               scale: None }
    }

    pub fn evaluate(&self, a: &[i32], b: &[i32]) -> Result<Vec<i32>, DomainError> {
        self.evaluate_many(&[a, b])
    }

    /// `(a op b op c ...) * scale`, asociando por la izquierda.
    pub fn evaluate_many(&self, operands: &[&[i32]]) -> Result<Vec<i32>, DomainError> {
        let Some((first, rest)) = operands.split_first() else {
            return Ok(Vec::new());
        };
        let mut acc = first.to_vec();
        for next in rest {
            if next.len() != acc.len() {
                return Err(DomainError::ShapeMismatch { left: acc.len(),
                                                        right: next.len() });
            }
            for (x, y) in acc.iter_mut().zip(next.iter()) {
                *x = match self.op {
                    VoxelOp::Sub => *x - y,
                    VoxelOp::Add => *x + y,
                };
            }
        }
        let k = self.scale.unwrap_or(1);
        if k != 1 {
            acc.iter_mut().for_each(|v| *v *= k);
        }
        Ok(acc)
    }
}
