//! Contratos de línea de comandos de las herramientas externas.
//!
//! Cada función construye una `ToolInvocation` completa; `SUBJECTS_DIR` viaja
//! en el entorno de cada invocación en vez de fijarse en el proceso.
use std::path::Path;

use rim_core::ToolInvocation;
use rim_domain::{ExpandAmount, LayeringModel, SubjectContext, VoxelExpr};

use crate::config::ToolConfig;

pub const SUBJECTS_DIR_ENV: &str = "SUBJECTS_DIR";

pub struct ToolContracts<'a> {
    config: &'a ToolConfig,
    subject: &'a SubjectContext,
}

impl<'a> ToolContracts<'a> {
    pub fn new(config: &'a ToolConfig, subject: &'a SubjectContext) -> Self {
        Self { config, subject }
    }

    fn invocation(&self, program: &str, output: &Path) -> ToolInvocation {
        ToolInvocation::new(program, output).env(SUBJECTS_DIR_ENV, self.subject.subjects_dir())
    }

    /// `mri_convert <src> <out> -vs r r r -rt cubic`
    pub fn resample(&self, source: &Path, voxel_mm: f64, output: &Path) -> ToolInvocation {
        let vs = voxel_mm.to_string();
        self.invocation(&self.config.mri_convert, output)
            .arg(source)
            .arg(output)
            .arg("-vs")
            .args([vs.as_str(), vs.as_str(), vs.as_str()])
            .args(["-rt", "cubic"])
    }

    /// `mris_expand [-thickness] <surf> <amount> <out>`
    pub fn expand(&self, source: &Path, amount: ExpandAmount, thickness: bool, output: &Path) -> ToolInvocation {
        let mut inv = self.invocation(&self.config.mris_expand, output);
        if thickness {
            inv = inv.arg("-thickness");
        }
        inv.arg(source).arg(amount.to_arg()).arg(output)
    }

    /// `mris_fill -c -r <res> -t <template> <surf> <out>`
    pub fn fill(&self, template: &Path, resolution_mm: f64, surface: &Path, output: &Path) -> ToolInvocation {
        self.invocation(&self.config.mris_fill, output)
            .args(["-c", "-r"])
            .arg(resolution_mm.to_string())
            .arg("-t")
            .arg(template)
            .arg(surface)
            .arg(output)
    }

    /// `fscalc <a> <op> <b> [<op> <c> ...] [mul <k>] -o <out>`
    pub fn calc(&self, operands: &[&Path], expr: VoxelExpr, output: &Path) -> ToolInvocation {
        let mut inv = self.invocation(&self.config.fscalc, output);
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                inv = inv.arg(expr.op.keyword());
            }
            inv = inv.arg(operand);
        }
        if let Some(k) = expr.scale {
            inv = inv.arg("mul").arg(k.to_string());
        }
        inv.arg("-o").arg(output)
    }

    /// `LN2_LAYERS -rim <rim> -nr_layers <n> [model flags] -incl_borders`
    ///
    /// LN2_LAYERS nombra sus salidas a partir del rim; `expected_output`
    /// declara cuál de ellas se verifica tras la ejecución.
    pub fn layers(&self, rim: &Path, layers: u32, model: LayeringModel, expected_output: &Path) -> ToolInvocation {
        self.invocation(&self.config.ln2_layers, expected_output)
            .arg("-rim")
            .arg(rim)
            .arg("-nr_layers")
            .arg(layers.to_string())
            .args(model.flags().iter().copied())
            .arg("-incl_borders")
    }
}
