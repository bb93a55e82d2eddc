use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rim_adapters::{build_pipeline, PipelinePlan, SimVolume, SimulatedToolRunner, ToolConfig, SUBJECTS_DIR_ENV};
use rim_core::{CoreEngineError, FailurePolicy, FlowEventKind, InMemoryEventStore, StepStatus};
use rim_domain::{Hemisphere, RawOptions, RimTarget, SubjectContext, SurfaceRole, TissueLabel};

struct Fixture {
    _dir: tempfile::TempDir,
    subjects: PathBuf,
}

impl Fixture {
    /// Sujeto `bert` con white y sólo la pial secundaria (`?h.pial.T1`).
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let subjects = dir.path().join("subjects");
        let surf = subjects.join("bert/surf");
        fs::create_dir_all(&surf).unwrap();
        fs::create_dir_all(subjects.join("bert/mri")).unwrap();
        fs::write(subjects.join("bert/mri/brain.finalsurfs.mgz"), b"brain").unwrap();
        for h in ["lh", "rh"] {
            fs::write(surf.join(format!("{h}.white")), format!("{h} white mesh")).unwrap();
            fs::write(surf.join(format!("{h}.pial.T1")), format!("{h} pial T1 mesh")).unwrap();
        }
        Self { _dir: dir, subjects }
    }

    fn surf(&self, name: &str) -> PathBuf {
        self.subjects.join("bert/surf").join(name)
    }

    fn plan(&self, raw: RawOptions) -> Rc<PipelinePlan> {
        let subject = SubjectContext::new(&self.subjects, "bert").unwrap();
        Rc::new(PipelinePlan::new(subject, raw.resolve().unwrap(), ToolConfig::default()))
    }
}

fn voxels(path: &Path) -> Vec<i32> {
    SimVolume::read(path).unwrap().voxels
}

fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = fs::read_dir(dir).unwrap()
                                             .map(|e| e.unwrap().path())
                                             .filter(|p| p.is_file())
                                             .map(|p| {
                                                 let bytes = fs::read(&p).unwrap();
                                                 (p, bytes)
                                             })
                                             .collect();
    files.sort();
    files
}

#[test]
fn full_run_materializes_every_artifact() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let mut engine = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient);

    let report = engine.run().unwrap();
    assert!(report.is_clean(), "failures: {:?}", report.failed);
    // 1 referencia + 8 superficies + 8 llenos + 6 etiquetas + 3 rims + 3 capas
    assert_eq!(report.produced, 29);
    assert_eq!(report.cached, 0);
    assert_eq!(report.steps.iter().map(|(_, s)| *s).collect::<Vec<_>>(), vec![StepStatus::FinishedOk; 4]);

    let layout = &plan.layout;
    assert!(layout.reference_volume().is_file());
    assert!(layout.work_dir().join("brain.finalsurfs.0.3mm.mgz").is_file());
    for hemi in Hemisphere::ALL {
        for role in SurfaceRole::ALL {
            assert!(layout.surface(hemi, role).is_file());
            assert!(layout.filled(hemi, role).is_file());
        }
        for label in TissueLabel::ALL {
            assert!(layout.label(hemi, label).is_file());
        }
    }
    for target in RimTarget::ALL {
        assert!(layout.rim(target).is_file());
        assert!(layout.layers(target).is_file());
    }

    assert_eq!(runner.calls_to("mri_convert"), 1);
    assert_eq!(runner.calls_to("mris_expand"), 4);
    assert_eq!(runner.calls_to("mris_fill"), 8);
    assert_eq!(runner.calls_to("fscalc"), 9);
    assert_eq!(runner.calls_to("LN2_LAYERS"), 3);
    assert_eq!(report.invocations, 25);

    let subjects_dir = std::ffi::OsString::from(fx.subjects.as_os_str());
    for call in runner.calls() {
        assert!(call.envs.contains(&(SUBJECTS_DIR_ENV.to_string(), subjects_dir.clone())),
                "{} without SUBJECTS_DIR",
                call.display_line());
    }

    let layering: Vec<String> = runner.calls()
                                      .into_iter()
                                      .filter(|c| c.program == "LN2_LAYERS")
                                      .map(|c| c.display_line())
                                      .collect();
    let lh_rim = layout.rim(RimTarget::Hemisphere(Hemisphere::Left));
    assert_eq!(layering[0],
               format!("LN2_LAYERS -rim {} -nr_layers 11 -equivol -iter_smooth 0 -incl_borders",
                       lh_rim.display()));
    assert!(layering[2].contains("both.rim.nii.gz"));
}

#[test]
fn second_run_reuses_everything() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let mut engine = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient);

    engine.run().unwrap();
    let before = snapshot(plan.layout.work_dir());
    let calls = runner.calls().len();

    let report = engine.run().unwrap();
    assert_eq!(report.invocations, 0);
    assert_eq!(report.produced, 0);
    assert_eq!(report.cached, 29);
    assert_eq!(runner.calls().len(), calls);
    assert_eq!(snapshot(plan.layout.work_dir()), before);

    let kinds: Vec<_> = engine.events().into_iter().map(|e| e.kind).collect();
    assert!(kinds.iter().all(|k| !matches!(k, FlowEventKind::ArtifactProduced { .. })));
    assert!(matches!(kinds.last(), Some(FlowEventKind::FlowCompleted { .. })));
}

#[test]
fn distance_mode_copies_source_surfaces_and_selects_secondary_pial() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient).run()
                                                                                                      .unwrap();

    for (hemi, h) in [(Hemisphere::Left, "lh"), (Hemisphere::Right, "rh")] {
        let gm_outer = fs::read(plan.layout.surface(hemi, SurfaceRole::GmOuter)).unwrap();
        let gm_inner = fs::read(plan.layout.surface(hemi, SurfaceRole::GmInner)).unwrap();
        assert_eq!(gm_outer, fs::read(fx.surf(&format!("{h}.pial.T1"))).unwrap());
        assert_eq!(gm_inner, fs::read(fx.surf(&format!("{h}.white"))).unwrap());
    }

    let expands: Vec<String> = runner.calls()
                                     .into_iter()
                                     .filter(|c| c.program == "mris_expand")
                                     .map(|c| c.display_line())
                                     .collect();
    assert!(expands[0].contains("lh.pial.T1 0.3 "), "{}", expands[0]);
    assert!(expands[1].contains("lh.white -0.30 "), "{}", expands[1]);
    assert!(expands.iter().all(|l| !l.contains("-thickness")));
}

#[test]
fn thickness_mode_expands_all_four_boundaries() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions { metric: Some("t".into()),
                                    ..RawOptions::default() });
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let report = build_pipeline(plan, InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient).run()
                                                                                                           .unwrap();
    assert!(report.is_clean());

    let amounts: Vec<String> = runner.calls()
                                     .into_iter()
                                     .filter(|c| c.program == "mris_expand")
                                     .map(|c| {
                                         assert_eq!(c.args[0], "-thickness");
                                         c.args[2].to_string_lossy().into_owned()
                                     })
                                     .collect();
    assert_eq!(amounts, vec!["0.30", "0.20", "-0.30", "-0.20", "0.30", "0.20", "-0.30", "-0.20"]);
}

#[test]
fn labels_are_disjoint_and_combined_rim_is_sum() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    build_pipeline(plan.clone(), InMemoryEventStore::default(), runner, FailurePolicy::Lenient).run()
                                                                                              .unwrap();
    let layout = &plan.layout;

    for hemi in Hemisphere::ALL {
        let labels: Vec<Vec<i32>> = TissueLabel::ALL.iter().map(|l| voxels(&layout.label(hemi, *l))).collect();
        for i in 0..labels[0].len() {
            let nonzero = labels.iter().filter(|v| v[i] != 0).count();
            assert!(nonzero <= 1, "voxel {i} carries {nonzero} labels");
        }
        for (label, v) in TissueLabel::ALL.iter().zip(&labels) {
            assert!(v.iter().all(|x| *x == 0 || *x == label.code()));
        }
        assert_eq!(voxels(&layout.rim(RimTarget::Hemisphere(hemi))), vec![0, 0, 2, 2, 3, 3, 3, 1, 1, 0, 0, 0]);
    }

    let lh = voxels(&layout.rim(RimTarget::Hemisphere(Hemisphere::Left)));
    let rh = voxels(&layout.rim(RimTarget::Hemisphere(Hemisphere::Right)));
    let both = voxels(&layout.rim(RimTarget::Both));
    let expected: Vec<i32> = lh.iter().zip(&rh).map(|(a, b)| a + b).collect();
    assert_eq!(both, expected);
}

#[test]
fn custom_nested_masks_give_disjoint_labels() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    runner.set_mask(SurfaceRole::CsfOuter, vec![0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0]);
    runner.set_mask(SurfaceRole::GmOuter, vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0]);
    runner.set_mask(SurfaceRole::GmInner, vec![0, 0, 0, 1, 1, 1, 1, 1, 0, 0, 0, 0]);
    runner.set_mask(SurfaceRole::WmBoundary, vec![0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0]);
    let report = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner, FailurePolicy::Lenient).run()
                                                                                                           .unwrap();
    assert!(report.is_clean());
    let layout = &plan.layout;

    for hemi in Hemisphere::ALL {
        let labels: Vec<Vec<i32>> = TissueLabel::ALL.iter().map(|l| voxels(&layout.label(hemi, *l))).collect();
        for i in 0..labels[0].len() {
            assert!(labels.iter().filter(|v| v[i] != 0).count() <= 1, "voxel {i} overlaps");
        }
        assert_eq!(voxels(&layout.rim(RimTarget::Hemisphere(hemi))), vec![0, 1, 3, 2, 2, 0, 0, 2, 3, 3, 1, 0]);
    }
    assert_eq!(voxels(&layout.rim(RimTarget::Both)), vec![0, 2, 6, 4, 4, 0, 0, 4, 6, 6, 2, 0]);
}

#[test]
fn changing_layer_count_or_model_reruns_layering() {
    let fx = Fixture::new();
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let first = fx.plan(RawOptions::default());
    build_pipeline(first.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient).run()
                                                                                                      .unwrap();
    assert_eq!(runner.calls_to("LN2_LAYERS"), 3);

    let second = fx.plan(RawOptions { layers: Some(7),
                                      model: Some("d".into()),
                                      ..RawOptions::default() });
    let mut engine = build_pipeline(second.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient);
    let report = engine.run().unwrap();
    assert!(report.is_clean());
    assert_eq!(runner.calls_to("LN2_LAYERS"), 6);
    // las etapas anteriores no dependen de las capas
    assert_eq!(runner.calls_to("mris_fill"), 8);
    let last = runner.calls().into_iter().filter(|c| c.program == "LN2_LAYERS").last().unwrap();
    assert!(last.display_line().contains("-nr_layers 7 -incl_borders"), "{}", last.display_line());
    for target in RimTarget::ALL {
        assert!(first.layout.layers_marker(target).is_file());
        assert!(second.layout.layers_marker(target).is_file());
    }

    let again = engine.run().unwrap();
    assert_eq!(again.invocations, 0);
    assert_eq!(runner.calls_to("LN2_LAYERS"), 6);
}

#[test]
fn stop_flag_skips_layering() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions { stop: Some("1".into()),
                                    ..RawOptions::default() });
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let report = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient)
        .run()
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.steps.len(), 3);
    assert_eq!(runner.calls_to("LN2_LAYERS"), 0);
    assert!(plan.layout.rim(RimTarget::Both).is_file());
    assert!(!plan.layout.layers(RimTarget::Both).exists());
}

#[test]
fn stop_flag_zero_still_runs_layering() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions { stop: Some("0".into()),
                                    ..RawOptions::default() });
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    build_pipeline(plan, InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient).run()
                                                                                              .unwrap();
    assert_eq!(runner.calls_to("LN2_LAYERS"), 3);
}

#[test]
fn lenient_missing_brain_records_failures_and_resumes() {
    let fx = Fixture::new();
    let brain = fx.subjects.join("bert/mri/brain.finalsurfs.mgz");
    fs::remove_file(&brain).unwrap();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let mut engine = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient);

    let report = engine.run().unwrap();
    // referencia + 8 llenos + 6 etiquetas + 3 rims + 3 capas
    assert_eq!(report.failed.len(), 21);
    assert_eq!(report.produced, 8);
    assert_eq!(report.failed[0], (plan.layout.reference_volume(), CoreEngineError::MissingInput(brain.clone())));
    assert!(report.failed.iter().all(|(_, e)| matches!(e, CoreEngineError::MissingInput(_))));
    // sólo las expansiones llegaron a invocarse
    assert_eq!(report.invocations, 4);
    assert_eq!(runner.calls_to("mris_fill"), 0);
    assert_eq!(report.steps[0].1, StepStatus::FinishedOk);
    assert_eq!(report.steps[1].1, StepStatus::FinishedWithFailures);

    fs::write(&brain, b"brain").unwrap();
    let report = engine.run().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.cached, 8);
    assert_eq!(report.produced, 21);
}

#[test]
fn strict_mode_aborts_on_first_failure() {
    let fx = Fixture::new();
    fs::remove_file(fx.subjects.join("bert/mri/brain.finalsurfs.mgz")).unwrap();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    let mut engine = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Strict);

    let err = engine.run().unwrap_err();
    match err {
        CoreEngineError::StepFailed { step_id, cause } => {
            assert_eq!(step_id, "fill_volumes");
            assert!(matches!(*cause, CoreEngineError::MissingInput(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(runner.calls_to("fscalc"), 0);
    assert!(!plan.layout.filled(Hemisphere::Left, SurfaceRole::CsfOuter).exists());
}

#[test]
fn failing_tool_leaves_no_partial_artifact() {
    let fx = Fixture::new();
    let plan = fx.plan(RawOptions::default());
    let runner = SimulatedToolRunner::new(ToolConfig::default());
    runner.fail_program("mris_fill");
    let mut engine = build_pipeline(plan.clone(), InMemoryEventStore::default(), runner.clone(), FailurePolicy::Lenient);

    let report = engine.run().unwrap();
    assert!(report.failed
                  .iter()
                  .any(|(_, e)| matches!(e, CoreEngineError::ToolFailed { program, .. } if program == "mris_fill")));
    let leftovers: Vec<_> = fs::read_dir(plan.layout.work_dir()).unwrap()
                                                                 .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                                                                 .filter(|n| n.starts_with(".partial.") || n.ends_with(".filled.mgz"))
                                                                 .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");

    runner.heal_program("mris_fill");
    let report = engine.run().unwrap();
    assert!(report.is_clean());
    assert_eq!(runner.calls_to("mris_expand"), 4);
}
