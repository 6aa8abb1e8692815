//! Mapper registration and multi-viewer bookkeeping.

use std::collections::HashMap;

use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::mappers::{
    ClickMapper, DragMapper, DragMode, EaseMapper, HoldMapper, InteractionMapper, SwipeMapper, WheelMapper,
};
use crate::scheduler::{Scheduler, TimerId};
use crate::viewer::{Listener, Viewer};

/// Builds a mapper from the viewer configuration.
pub type MapperFactory = fn(&ViewerConfig) -> Box<dyn InteractionMapper>;

/// Interaction mappers by name.
///
/// ## Example
///
/// ```rust
/// use spinview_core::{MapperRegistry, ViewerConfig};
///
/// let registry = MapperRegistry::with_defaults();
/// let config = ViewerConfig {
///     mappers: vec!["drag".into(), "ease".into()],
///     ..Default::default()
/// };
/// let mappers = registry.create_all(&config).unwrap();
/// assert_eq!(mappers[1].name(), "ease");
///
/// assert!(registry.create("spin", &config).is_err());
/// ```
#[derive(Clone, Default)]
pub struct MapperRegistry {
    factories: HashMap<String, MapperFactory>,
}

impl MapperRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in mappers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, MapperFactory); 7] = [
            ("drag", |_| Box::new(DragMapper::new(DragMode::Press))),
            ("move", |_| Box::new(DragMapper::new(DragMode::Hover))),
            ("click", |_| Box::new(ClickMapper)),
            ("swipe", |config| Box::new(SwipeMapper::new(config.swipe))),
            ("hold", |config| Box::new(HoldMapper::new(config.hold))),
            ("ease", |config| Box::new(EaseMapper::new(config.ease))),
            ("wheel", |_| Box::new(WheelMapper)),
        ];
        for (name, factory) in builtins {
            registry.factories.insert(name.to_string(), factory);
        }
        registry
    }

    /// Register a mapper under `name`. Names are unique.
    pub fn register(&mut self, name: impl Into<String>, factory: MapperFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::DuplicateMapper(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Check if a mapper is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the mapper registered under `name`.
    pub fn create(&self, name: &str, config: &ViewerConfig) -> Result<Box<dyn InteractionMapper>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::UnknownMapper(name.to_string()))?;
        log::debug!("creating mapper `{name}`");
        Ok(factory(config))
    }

    /// Build every mapper named in `config.mappers`, in order.
    pub fn create_all(&self, config: &ViewerConfig) -> Result<Vec<Box<dyn InteractionMapper>>> {
        config.mappers.iter().map(|name| self.create(name, config)).collect()
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperRegistry").field("names", &self.names()).finish()
    }
}

/// Stable reference to a viewer owned by a [`Registry`].
///
/// Handles of destroyed viewers never resolve again, even after their slot
/// is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewerHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    viewer: Option<Viewer>,
}

/// Owner of any number of independent viewers.
#[derive(Debug)]
pub struct Registry {
    mappers: MapperRegistry,
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(MapperRegistry::with_defaults())
    }
}

impl Registry {
    /// Create a registry building mappers from `mappers`.
    pub fn new(mappers: MapperRegistry) -> Self {
        Self {
            mappers,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Mapper factories used for new viewers.
    pub fn mappers_mut(&mut self) -> &mut MapperRegistry {
        &mut self.mappers
    }

    /// Validate `config`, build a viewer with its mappers and listeners and
    /// initialize it.
    pub fn create(
        &mut self,
        config: &ViewerConfig,
        scheduler: Box<dyn Scheduler>,
        listeners: Vec<Box<dyn Listener>>,
    ) -> Result<ViewerHandle> {
        let mappers = self.mappers.create_all(config)?;
        let mut viewer = Viewer::new(config, mappers, scheduler)?;
        for listener in listeners {
            viewer.core_mut().add_boxed_listener(listener);
        }
        viewer.init();

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    viewer: None,
                });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.viewer = Some(viewer);
        let handle = ViewerHandle {
            index,
            generation: slot.generation,
        };
        log::debug!("created viewer {handle:?}");
        Ok(handle)
    }

    /// The viewer behind `handle`, unless it was destroyed.
    pub fn get(&self, handle: ViewerHandle) -> Option<&Viewer> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.viewer.as_ref())
    }

    /// The viewer behind `handle`, unless it was destroyed.
    pub fn get_mut(&mut self, handle: ViewerHandle) -> Option<&mut Viewer> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.viewer.as_mut())
    }

    /// Destroy the viewer behind `handle`. Returns `false` for stale handles.
    pub fn destroy(&mut self, handle: ViewerHandle) -> bool {
        let Some(mut viewer) = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.viewer.take())
        else {
            return false;
        };
        viewer.destroy();

        let slot = &mut self.slots[handle.index];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        log::debug!("destroyed viewer {handle:?}");
        true
    }

    /// Forward a fired timer to every live viewer. Viewers ignore ids they
    /// did not arm.
    pub fn on_timer(&mut self, id: TimerId) {
        for viewer in self.slots.iter_mut().filter_map(|slot| slot.viewer.as_mut()) {
            viewer.on_timer(id);
        }
    }

    /// Number of live viewers.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.viewer.is_some()).count()
    }

    /// Whether no viewer is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ImageSize, NoProbe};
    use crate::scheduler::VirtualClock;
    use crate::viewer::{Event, ViewerState};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_default_mapper_names() {
        let registry = MapperRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["click", "drag", "ease", "hold", "move", "swipe", "wheel"]
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = MapperRegistry::with_defaults();
        let result = registry.register("drag", |_| Box::new(ClickMapper));
        assert_eq!(result, Err(Error::DuplicateMapper("drag".to_string())));

        registry.register("tap", |_| Box::new(ClickMapper)).unwrap();
        assert!(registry.contains("tap"));
        let mapper = registry.create("tap", &ViewerConfig::default()).unwrap();
        assert_eq!(mapper.name(), "click");
    }

    #[test]
    fn test_unknown_mapper() {
        let config = ViewerConfig {
            mappers: vec!["drag".into(), "spin".into()],
            ..Default::default()
        };
        let mut registry = Registry::default();
        let result = registry.create(&config, Box::new(VirtualClock::new()), Vec::new());
        assert_eq!(result, Err(Error::UnknownMapper("spin".to_string())));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ViewerConfig {
            lanes: 0,
            ..Default::default()
        };
        let mut registry = Registry::default();
        assert!(matches!(
            registry.create(&config, Box::new(VirtualClock::new()), Vec::new()),
            Err(Error::InvalidConfig { field: "lanes", .. })
        ));
    }

    #[test_log::test]
    fn test_create_and_destroy() {
        let events: Rc<RefCell<Vec<Event>>> = Rc::default();
        let sink = Rc::clone(&events);
        let listener: Box<dyn Listener> = Box::new(move |event: Event, _: &ViewerState| {
            sink.borrow_mut().push(event);
        });

        let mut registry = Registry::default();
        let handle = registry
            .create(&ViewerConfig::default(), Box::new(VirtualClock::new()), vec![listener])
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(handle).unwrap().state().is_loading());

        assert!(registry.destroy(handle));
        assert!(!registry.destroy(handle));
        assert!(registry.get(handle).is_none());
        assert_eq!(*events.borrow(), vec![Event::Init, Event::Destroy]);

        // The slot is reused but the old handle stays dead
        let reused = registry
            .create(&ViewerConfig::default(), Box::new(VirtualClock::new()), Vec::new())
            .unwrap();
        assert_ne!(reused, handle);
        assert!(registry.get(handle).is_none());
        assert!(registry.get(reused).is_some());
    }

    #[test]
    fn test_viewers_share_a_clock_independently() {
        let clock = VirtualClock::new();
        let config = ViewerConfig {
            frames: Some(10),
            ..Default::default()
        };
        let mut registry = Registry::default();
        let a = registry.create(&config, Box::new(clock.clone()), Vec::new()).unwrap();
        let b = registry.create(&config, Box::new(clock.clone()), Vec::new()).unwrap();

        registry.get_mut(a).unwrap().load(&[ImageSize::new(100, 10)], &mut NoProbe);
        for id in clock.advance(80) {
            registry.on_timer(id);
        }
        registry.get_mut(b).unwrap().load(&[ImageSize::new(100, 10)], &mut NoProbe);
        for id in clock.advance(40) {
            registry.on_timer(id);
        }

        assert_eq!(registry.get(a).unwrap().state().frame(), 3);
        assert_eq!(registry.get(b).unwrap().state().frame(), 1);
    }
}
