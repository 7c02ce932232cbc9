//! Écoute des gestes utilisateur (clic, toucher, clavier)

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Click,
    TouchStart,
    KeyDown,
}

impl Gesture {
    pub const ALL: [Gesture; 3] = [Gesture::Click, Gesture::TouchStart, Gesture::KeyDown];

    pub fn event_name(&self) -> &'static str {
        match self {
            Gesture::Click => "click",
            Gesture::TouchStart => "touchstart",
            Gesture::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Options d'installation du listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Phase de capture, passif : le listener ne bloque jamais le défilement
    pub const GESTURE: Self = Self {
        capture: true,
        passive: true,
    };
}

/// Surface sur laquelle la plateforme installe le listener de document
pub trait GestureSurface: Send + Sync {
    fn attach(&self, events: &[Gesture], options: ListenerOptions);
    fn detach(&self);
}

/// Surface sans effet, pour les environnements qui poussent les gestes eux-mêmes
#[derive(Debug, Default)]
pub struct NoopGestureSurface;

impl GestureSurface for NoopGestureSurface {
    fn attach(&self, _events: &[Gesture], _options: ListenerOptions) {}
    fn detach(&self) {}
}

/// Listener à usage unique.
///
/// Tant qu'il est armé, le premier geste le désarme et déclenche le
/// déverrouillage ; les suivants sont ignorés jusqu'au prochain `arm()`.
pub struct GestureGate {
    armed: AtomicBool,
    surface: Arc<dyn GestureSurface>,
}

impl GestureGate {
    pub fn new(surface: Arc<dyn GestureSurface>) -> Self {
        Self {
            armed: AtomicBool::new(false),
            surface,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn arm(&self) {
        if !self.armed.swap(true, Ordering::SeqCst) {
            self.surface.attach(&Gesture::ALL, ListenerOptions::GESTURE);
            tracing::debug!("Gesture listener installed");
        }
    }

    /// Retire le listener ; `true` s'il était installé.
    pub fn disarm(&self) -> bool {
        let was_armed = self.armed.swap(false, Ordering::SeqCst);
        if was_armed {
            self.surface.detach();
            tracing::debug!("Gesture listener removed");
        }
        was_armed
    }

    /// Consomme un geste : `true` s'il doit déclencher le déverrouillage.
    pub fn fire(&self, gesture: Gesture) -> bool {
        let fired = self.disarm();
        if fired {
            tracing::debug!(%gesture, "User gesture captured");
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<String>>,
    }

    impl GestureSurface for RecordingSurface {
        fn attach(&self, events: &[Gesture], options: ListenerOptions) {
            assert!(options.capture && options.passive);
            let names: Vec<_> = events.iter().map(|g| g.event_name()).collect();
            self.calls.lock().push(format!("attach {}", names.join(",")));
        }
        fn detach(&self) {
            self.calls.lock().push("detach".into());
        }
    }

    #[test]
    fn test_gate_fires_once() {
        let surface = Arc::new(RecordingSurface::default());
        let gate = GestureGate::new(surface.clone());
        assert!(!gate.fire(Gesture::Click));

        gate.arm();
        gate.arm();
        assert!(gate.fire(Gesture::KeyDown));
        assert!(!gate.fire(Gesture::Click));

        assert_eq!(
            *surface.calls.lock(),
            vec!["attach click,touchstart,keydown".to_string(), "detach".to_string()]
        );
    }
}
