//! Category-exclusive ownership of live renderable objects.
//!
//! Builders spawn an object and hand it over with [`SceneRegistry::replace`];
//! the registry disposes whatever previously occupied the category. All
//! spawning and despawning goes through one command buffer, so a frame sees
//! either the old object or the new one, never both.

use bevy::ecs::system::SystemParam;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::volume::material::VolumeMaterial;

/// Renderable categories, each holding at most one live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneCategory {
    Anatomy,
    Volume,
    Timeline,
}

impl SceneCategory {
    pub const ALL: [SceneCategory; 3] = [Self::Anatomy, Self::Volume, Self::Timeline];

    fn index(self) -> usize {
        match self {
            Self::Anatomy => 0,
            Self::Volume => 1,
            Self::Timeline => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anatomy => "anatomy",
            Self::Volume => "volume",
            Self::Timeline => "timeline",
        }
    }
}

/// GPU-backed asset exclusively owned by one scene object.
#[derive(Debug, Clone)]
pub enum OwnedAsset {
    Mesh(Handle<Mesh>),
    Image(Handle<Image>),
    StandardMaterial(Handle<StandardMaterial>),
    VolumeMaterial(Handle<VolumeMaterial>),
    Gltf(Handle<Gltf>),
}

/// Root entity of a spawned hierarchy plus every asset it owns.
#[derive(Debug)]
pub struct SceneObject {
    pub root: Entity,
    pub assets: Vec<OwnedAsset>,
}

impl SceneObject {
    pub fn new(root: Entity) -> Self {
        Self {
            root,
            assets: Vec::new(),
        }
    }

    pub fn with_asset(mut self, asset: OwnedAsset) -> Self {
        self.assets.push(asset);
        self
    }
}

/// Releases a detached object. Implemented over the ECS by [`SceneAssets`].
pub trait SceneDisposer {
    fn dispose(&mut self, category: SceneCategory, object: SceneObject);
}

#[derive(Resource, Default, Debug)]
pub struct SceneRegistry {
    slots: [Option<SceneObject>; 3],
}

impl SceneRegistry {
    /// Detach and dispose the current occupant of `category`, then attach
    /// `object` if given. Returns true when a previous object was disposed.
    pub fn replace<D: SceneDisposer>(
        &mut self,
        category: SceneCategory,
        object: Option<SceneObject>,
        disposer: &mut D,
    ) -> bool {
        let slot = &mut self.slots[category.index()];

        // Re-attaching the live instance is a no-op rather than a dispose.
        if let (Some(current), Some(incoming)) = (slot.as_ref(), object.as_ref()) {
            if current.root == incoming.root {
                return false;
            }
        }

        let previous = std::mem::replace(slot, object);
        match previous {
            Some(previous) => {
                disposer.dispose(category, previous);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, category: SceneCategory) -> Option<&SceneObject> {
        self.slots[category.index()].as_ref()
    }

    pub fn is_attached(&self, category: SceneCategory) -> bool {
        self.get(category).is_some()
    }

    pub fn attached(&self) -> impl Iterator<Item = SceneCategory> + '_ {
        SceneCategory::ALL
            .into_iter()
            .filter(|category| self.is_attached(*category))
    }

    /// Dispose every attached object.
    pub fn clear<D: SceneDisposer>(&mut self, disposer: &mut D) {
        for category in SceneCategory::ALL {
            self.replace(category, None, disposer);
        }
    }
}

/// Command buffer and asset stores used to build and release scene objects.
#[derive(SystemParam)]
pub struct SceneAssets<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub images: ResMut<'w, Assets<Image>>,
    pub standard_materials: ResMut<'w, Assets<StandardMaterial>>,
    pub volume_materials: ResMut<'w, Assets<VolumeMaterial>>,
}

impl SceneDisposer for SceneAssets<'_, '_> {
    fn dispose(&mut self, category: SceneCategory, object: SceneObject) {
        if let Ok(mut entity) = self.commands.get_entity(object.root) {
            entity.despawn();
        }

        for asset in object.assets {
            match asset {
                OwnedAsset::Mesh(handle) => {
                    self.meshes.remove(&handle);
                }
                OwnedAsset::Image(handle) => {
                    self.images.remove(&handle);
                }
                OwnedAsset::StandardMaterial(handle) => {
                    self.standard_materials.remove(&handle);
                }
                OwnedAsset::VolumeMaterial(handle) => {
                    self.volume_materials.remove(&handle);
                }
                // Dropping the last strong handle unloads the glTF and its sub-assets.
                OwnedAsset::Gltf(handle) => drop(handle),
            }
        }

        debug!("Disposed {} object {:?}", category.as_str(), object.root);
    }
}
