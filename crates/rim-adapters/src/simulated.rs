//! Runner simulado de herramientas.
//!
//! Imita los contratos de `tools.rs` sobre volúmenes sintéticos: un volumen es
//! un JSON `{"voxels": [...]}` con enteros. Los volúmenes llenos salen de
//! máscaras binarias por rol (anidadas por defecto), la aritmética usa
//! `VoxelExpr` y el motor de capas escribe su salida junto al rim, con el
//! mismo nombre que usaría LN2_LAYERS.
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use rim_core::{CoreEngineError, ToolInvocation, ToolRunner, ToolStatus};
use rim_domain::{SurfaceRole, VoxelExpr, VoxelOp};

use crate::config::ToolConfig;

/// Número de vóxeles de los volúmenes simulados.
pub const SIM_VOXELS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimVolume {
    pub voxels: Vec<i32>,
}

impl SimVolume {
    pub fn read(path: &Path) -> Result<SimVolume, CoreEngineError> {
        let text = fs::read_to_string(path).map_err(|e| CoreEngineError::io(path, &e))?;
        serde_json::from_str(&text).map_err(|e| CoreEngineError::Internal(format!("{}: {e}", path.display())))
    }

    fn write(&self, path: &Path) -> Result<(), CoreEngineError> {
        let text = serde_json::to_string(self).map_err(|e| CoreEngineError::Internal(e.to_string()))?;
        fs::write(path, text).map_err(|e| CoreEngineError::io(path, &e))
    }
}

/// Máscaras anidadas: `csf_outer ⊇ gm_outer ⊇ gm_inner ⊇ wm_boundary`.
pub fn nested_mask(role: SurfaceRole) -> Vec<i32> {
    let radius = match role {
        SurfaceRole::CsfOuter => 9,
        SurfaceRole::GmOuter => 7,
        SurfaceRole::GmInner => 4,
        SurfaceRole::WmBoundary => 2,
    };
    (0..SIM_VOXELS).map(|i| i32::from(i < radius)).collect()
}

struct SimState {
    config: ToolConfig,
    calls: RefCell<Vec<ToolInvocation>>,
    failing: RefCell<HashSet<String>>,
    masks: RefCell<HashMap<SurfaceRole, Vec<i32>>>,
}

/// Clonable: los clones comparten el registro de invocaciones.
#[derive(Clone)]
pub struct SimulatedToolRunner {
    state: Rc<SimState>,
}

impl SimulatedToolRunner {
    pub fn new(config: ToolConfig) -> Self {
        let masks = SurfaceRole::ALL.into_iter().map(|r| (r, nested_mask(r))).collect();
        Self { state: Rc::new(SimState { config,
                                         calls: RefCell::new(Vec::new()),
                                         failing: RefCell::new(HashSet::new()),
                                         masks: RefCell::new(masks) }) }
    }

    pub fn set_mask(&self, role: SurfaceRole, mask: Vec<i32>) {
        self.state.masks.borrow_mut().insert(role, mask);
    }

    /// Hace que `program` termine con estado 1 sin escribir nada.
    pub fn fail_program(&self, program: &str) {
        self.state.failing.borrow_mut().insert(program.to_string());
    }

    pub fn heal_program(&self, program: &str) {
        self.state.failing.borrow_mut().remove(program);
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.state.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.state.calls.borrow().iter().filter(|c| c.program == program).count()
    }

    fn simulate(&self, inv: &ToolInvocation) -> Result<(), CoreEngineError> {
        let cfg = &self.state.config;
        let args: Vec<&OsString> = inv.args.iter().collect();
        let p = inv.program.as_str();
        if p == cfg.mri_convert {
            require(arg_path(&args, 0)?)?;
            SimVolume { voxels: vec![0; SIM_VOXELS] }.write(&inv.output)
        } else if p == cfg.mris_expand {
            let n = args.len();
            if n < 3 {
                return Err(bad_args(inv));
            }
            let source = require(arg_path(&args, n - 3)?)?;
            let mut bytes = fs::read(&source).map_err(|e| CoreEngineError::io(&source, &e))?;
            bytes.extend_from_slice(format!("\nexpanded {}", args[n - 2].to_string_lossy()).as_bytes());
            fs::write(&inv.output, bytes).map_err(|e| CoreEngineError::io(&inv.output, &e))
        } else if p == cfg.mris_fill {
            let n = args.len();
            if n < 2 {
                return Err(bad_args(inv));
            }
            let surface = require(arg_path(&args, n - 2)?)?;
            let name = surface.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
            let role = SurfaceRole::from_file_name(&name).ok_or_else(|| bad_args(inv))?;
            let voxels = self.state.masks.borrow().get(&role).cloned().unwrap_or_else(|| nested_mask(role));
            SimVolume { voxels }.write(&inv.output)
        } else if p == cfg.fscalc {
            self.simulate_calc(inv, &args)
        } else if p == cfg.ln2_layers {
            let idx = args.iter().position(|a| a.as_os_str() == "-rim").ok_or_else(|| bad_args(inv))?;
            let rim = require(arg_path(&args, idx + 1)?)?;
            let layers = layers_output_for(&rim);
            SimVolume::read(&rim)?.write(&layers)
        } else {
            Err(CoreEngineError::ToolSpawn { program: inv.program.clone(),
                                             reason: "not simulated".into() })
        }
    }

    fn simulate_calc(&self, inv: &ToolInvocation, args: &[&OsString]) -> Result<(), CoreEngineError> {
        let words: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        let end = words.iter().position(|w| w == "-o").ok_or_else(|| bad_args(inv))?;
        let mut operands = Vec::new();
        let mut op = None;
        let mut scale = None;
        let mut i = 0;
        while i < end {
            let w = words[i].as_str();
            if w == "mul" {
                scale = words.get(i + 1).and_then(|k| k.parse::<i32>().ok());
                i += 2;
                continue;
            }
            match VoxelOp::from_keyword(w) {
                Some(o) => op = Some(o),
                None => operands.push(SimVolume::read(&require(PathBuf::from(w))?)?.voxels),
            }
            i += 1;
        }
        let expr = VoxelExpr { op: op.unwrap_or(VoxelOp::Add),
                               scale };
        let refs: Vec<&[i32]> = operands.iter().map(|v| v.as_slice()).collect();
        let voxels = expr.evaluate_many(&refs)
                         .map_err(|e| CoreEngineError::Internal(e.to_string()))?;
        SimVolume { voxels }.write(&inv.output)
    }
}

impl ToolRunner for SimulatedToolRunner {
    fn run(&self, inv: &ToolInvocation) -> Result<ToolStatus, CoreEngineError> {
        self.state.calls.borrow_mut().push(inv.clone());
        if self.state.failing.borrow().contains(&inv.program) {
            return Ok(ToolStatus::failed(Some(1)));
        }
        match self.simulate(inv) {
            Ok(()) => Ok(ToolStatus::ok()),
            Err(CoreEngineError::ToolSpawn { program, reason }) => Err(CoreEngineError::ToolSpawn { program, reason }),
            // Una herramienta real terminaría con error al no encontrar su entrada.
            Err(_) => Ok(ToolStatus::failed(Some(1))),
        }
    }

    fn invocation_count(&self) -> usize {
        self.state.calls.borrow().len()
    }
}

/// Nombre de salida de LN2_LAYERS para un rim: `<rim sin .nii.gz>_layers.nii.gz`.
pub fn layers_output_for(rim: &Path) -> PathBuf {
    let name = rim.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = name.strip_suffix(".nii.gz").unwrap_or(&name);
    rim.with_file_name(format!("{stem}_layers.nii.gz"))
}

fn arg_path(args: &[&OsString], idx: usize) -> Result<PathBuf, CoreEngineError> {
    args.get(idx)
        .map(|a| PathBuf::from(a.as_os_str()))
        .ok_or_else(|| CoreEngineError::Internal(format!("missing argument {idx}")))
}

fn require(path: PathBuf) -> Result<PathBuf, CoreEngineError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(CoreEngineError::MissingInput(path))
    }
}

fn bad_args(inv: &ToolInvocation) -> CoreEngineError {
    CoreEngineError::Internal(format!("unexpected arguments: {}", inv.display_line()))
}
