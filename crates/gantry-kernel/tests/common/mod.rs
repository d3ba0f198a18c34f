//! Shared fixtures for kernel integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gantry_events::{ChangeListener, ChangeNotice, Operation};
use gantry_kernel::{Capabilities, Hook, HookOutput, Module, ModuleHost};

/// Ordered log of hook invocations and notices, shared across modules.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub fn clear(journal: &Journal) {
    journal.lock().unwrap().clear();
}

/// Blueprint for a recording test module; `factory()` hands the host
/// a constructor so reloads produce fresh instances against the same
/// journal.
#[derive(Clone)]
pub struct ModuleSpec {
    name: &'static str,
    caps: Capabilities,
    journal: Journal,
    outputs: HashMap<Hook, HookOutput>,
    panic_on_update: bool,
    scene_slot: Option<Arc<Mutex<Option<HookOutput>>>>,
}

impl ModuleSpec {
    pub fn new(name: &'static str, caps: Capabilities, journal: &Journal) -> Self {
        Self {
            name,
            caps,
            journal: journal.clone(),
            outputs: HashMap::new(),
            panic_on_update: false,
            scene_slot: None,
        }
    }

    pub fn output(mut self, hook: Hook, output: HookOutput) -> Self {
        self.outputs.insert(hook, output);
        self
    }

    pub fn panics_on_update(mut self) -> Self {
        self.panic_on_update = true;
        self
    }

    pub fn scene_slot(mut self, slot: &Arc<Mutex<Option<HookOutput>>>) -> Self {
        self.scene_slot = Some(slot.clone());
        self
    }

    pub fn factory(self) -> impl Fn() -> Box<dyn Module> + Send + Sync + 'static {
        move || {
            Box::new(RecordingModule {
                spec: self.clone(),
            })
        }
    }
}

pub struct RecordingModule {
    spec: ModuleSpec,
}

impl RecordingModule {
    fn record(&self, what: &str) {
        self.spec
            .journal
            .lock()
            .unwrap()
            .push(format!("{}:{}", what, self.spec.name));
    }

    fn output_for(&self, hook: Hook) -> HookOutput {
        self.spec.outputs.get(&hook).cloned().unwrap_or_default()
    }
}

impl Module for RecordingModule {
    fn capabilities(&self) -> Capabilities {
        self.spec.caps
    }

    fn on_load(&mut self) {
        self.record("load");
    }

    fn init(&mut self) {
        self.record("init");
    }

    fn on_enable(&mut self) {
        self.record("enable");
    }

    fn on_disable(&mut self) {
        self.record("disable");
    }

    fn on_update(&mut self) -> HookOutput {
        if self.spec.panic_on_update {
            panic!("update exploded");
        }
        self.record("update");
        self.output_for(Hook::OnUpdate)
    }

    fn before_render_early(&mut self) -> HookOutput {
        self.record("early");
        self.output_for(Hook::BeforeRenderEarly)
    }

    fn before_render_late(&mut self) -> HookOutput {
        self.record("late");
        self.output_for(Hook::BeforeRenderLate)
    }

    fn on_render(&mut self, scene: &HookOutput) {
        self.record("render");
        if let Some(slot) = &self.spec.scene_slot {
            *slot.lock().unwrap() = Some(scene.clone());
        }
    }

    fn module_config(&mut self) -> HookOutput {
        self.record("config");
        self.output_for(Hook::ModuleConfig)
    }
}

/// Listener that appends notices to the shared journal, so ordering
/// against hook invocations can be asserted.
pub struct Recorder {
    journal: Journal,
}

impl Recorder {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl ChangeListener for Recorder {
    fn on_change(&mut self, notice: &ChangeNotice) {
        let op = match notice.operation {
            Operation::Load => "load",
            Operation::Enable => "enable",
            Operation::Disable => "disable",
        };
        self.journal
            .lock()
            .unwrap()
            .push(format!("notice:{}:{}", op, notice.key));
    }
}

/// `enabled == true` implies the record is resolved and has a handle.
pub fn assert_invariants(host: &ModuleHost) {
    for record in host.registry().iter() {
        if record.is_enabled() {
            assert!(
                !record.is_pending(),
                "enabled module {} must not be pending",
                record.key()
            );
            assert!(
                record.has_handle(),
                "enabled module {} must have a handle",
                record.key()
            );
        }
    }
}
