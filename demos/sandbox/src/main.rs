// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Orrery Sandbox
// Demo binary driving an animated scene through the update pipeline

use anyhow::{Context, Result};
use orrery_core::math::{Aabb, Mat4, Vec3};
use orrery_core::JobSystem;
use orrery_data::ecs::components::{AnimationChannel, AnimationPath, AnimationSampler, LightKind};
use orrery_data::ecs::Entity;
use orrery_scene::{snapshot, Scene};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAME_COUNT: u32 = 240;
const CHECKPOINT_FRAME: u32 = 120;

/// Creates a renderable object at `position` carrying a box mesh of the
/// given half extents.
fn spawn_box(scene: &mut Scene, name: &str, position: Vec3, half_extents: Vec3) -> Entity {
    let mesh = scene.entity_create_mesh(&format!("{name}_mesh"));
    if let Some(mesh_data) = scene.meshes.get_by_entity_mut(mesh) {
        mesh_data.bounds = Aabb::from_center_half_extents(Vec3::ZERO, half_extents);
    }

    let object = scene.entity_create_object(name);
    if let Some(object_data) = scene.objects.get_by_entity_mut(object) {
        object_data.mesh_id = mesh;
    }
    if let Some(transform) = scene.transforms.get_by_entity_mut(object) {
        transform.translate(position);
    }
    object
}

/// A pivot entity orbited by a crate, a lamp and a spark emitter, plus a
/// looping clip that slides the pivot back and forth along the x axis.
fn spawn_carousel(scene: &mut Scene) -> Entity {
    let pivot = scene.entity_create_object("pivot");

    let crate_box = spawn_box(scene, "crate", Vec3::new(2.0, 0.5, 0.0), Vec3::splat(0.5));
    scene.attach(crate_box, pivot, true);

    let lamp = scene.entity_create_light(
        "lamp",
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::new(1.0, 0.85, 0.6),
        60.0,
        9.0,
    );
    scene.attach(lamp, pivot, true);

    let sparks = scene.entity_create_emitter("sparks", Vec3::new(0.0, 0.5, 0.0));
    scene.attach(sparks, pivot, true);

    // Slide out to (6, 0, 0) and back over four seconds, forever.
    let clip_entity = scene.create_entity();
    let slot = scene.animations.create(clip_entity);
    let clip = scene.animations.get_mut(slot);
    clip.end = 4.0;
    clip.channels.push(AnimationChannel {
        target: pivot,
        sampler_index: 0,
        path: AnimationPath::Translation,
    });
    clip.samplers.push(AnimationSampler {
        keyframe_times: vec![0.0, 2.0, 4.0],
        keyframe_data: vec![
            0.0, 0.0, 0.0, //
            6.0, 0.0, 0.0, //
            0.0, 0.0, 0.0,
        ],
        ..Default::default()
    });
    clip.play();

    pivot
}

/// A two-bone rig driving a skinned body, with the tip bone waving up and
/// down so the rig bounds visibly deform.
fn spawn_dancer(scene: &mut Scene) -> Entity {
    let rig = scene.entity_create_armature("dancer_rig");
    if let Some(transform) = scene.transforms.get_by_entity_mut(rig) {
        transform.translate(Vec3::new(-6.0, 0.0, 0.0));
    }

    let root_bone = scene.entity_create_bone("dancer_root", rig, Mat4::IDENTITY);
    scene.attach(root_bone, rig, true);
    let tip_bone = scene.entity_create_bone(
        "dancer_tip",
        rig,
        Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)),
    );
    scene.attach(tip_bone, root_bone, true);
    if let Some(transform) = scene.transforms.get_by_entity_mut(tip_bone) {
        transform.translate(Vec3::new(0.0, 2.0, 0.0));
    }

    let mesh = scene.entity_create_mesh("dancer_mesh");
    if let Some(mesh_data) = scene.meshes.get_by_entity_mut(mesh) {
        mesh_data.bounds = Aabb::from_center_half_extents(Vec3::new(0.0, 1.0, 0.0), Vec3::ONE);
        mesh_data.armature_id = rig;
    }

    let body = scene.entity_create_object("dancer");
    if let Some(object_data) = scene.objects.get_by_entity_mut(body) {
        object_data.mesh_id = mesh;
    }
    if let Some(transform) = scene.transforms.get_by_entity_mut(body) {
        transform.translate(Vec3::new(-6.0, 0.0, 0.0));
    }

    // Wave the tip bone between two and three units up, looping.
    let clip_entity = scene.create_entity();
    let slot = scene.animations.create(clip_entity);
    let clip = scene.animations.get_mut(slot);
    clip.end = 2.0;
    clip.channels.push(AnimationChannel {
        target: tip_bone,
        sampler_index: 0,
        path: AnimationPath::Translation,
    });
    clip.samplers.push(AnimationSampler {
        keyframe_times: vec![0.0, 1.0, 2.0],
        keyframe_data: vec![
            0.0, 2.0, 0.0, //
            0.0, 3.0, 0.0, //
            0.0, 2.0, 0.0,
        ],
        ..Default::default()
    });
    clip.play();

    body
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();

    spawn_box(
        &mut scene,
        "ground",
        Vec3::ZERO,
        Vec3::new(20.0, 0.1, 20.0),
    );

    let sun = scene.entity_create_light(
        "sun",
        Vec3::new(0.0, 30.0, 0.0),
        Vec3::new(1.0, 1.0, 0.95),
        10.0,
        1.0,
    );
    if let Some(light) = scene.lights.get_by_entity_mut(sun) {
        light.kind = LightKind::Directional;
    }

    let camera = scene.entity_create_camera("viewer", 1920.0, 1080.0, 0.1, 500.0, 1.2);
    if let Some(transform) = scene.transforms.get_by_entity_mut(camera) {
        transform.translate(Vec3::new(0.0, 4.0, -14.0));
    }

    spawn_carousel(&mut scene);
    spawn_dancer(&mut scene);

    scene
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let jobs = JobSystem::new();
    let mut scene = build_scene();
    let pivot = scene.find_by_name("pivot");
    let sparks = scene.find_by_name("sparks");
    anyhow::ensure!(pivot.is_valid(), "the carousel pivot went missing");

    log::info!(
        "Simulating {} frames over {} transform(s).",
        FRAME_COUNT,
        scene.transforms.len()
    );

    let mut checkpoint = None;
    for frame in 0..FRAME_COUNT {
        scene.update(FRAME_DT, &jobs);

        if frame == CHECKPOINT_FRAME {
            let bytes = snapshot::encode(&scene)?;
            log::info!(
                "Captured a {} byte checkpoint at frame {}.",
                bytes.len(),
                frame
            );
            checkpoint = Some(bytes);
        }

        if frame % 60 == 0 {
            let pivot_world = scene
                .transforms
                .get_by_entity(pivot)
                .context("pivot lost its transform")?
                .world;
            let burst = scene
                .emitters
                .get_by_entity(sparks)
                .map(|e| e.burst)
                .unwrap_or(0);
            log::info!(
                "frame {:3}: pivot at x = {:+.2}, sparks burst = {}, scene bounds x = [{:+.2}, {:+.2}]",
                frame,
                pivot_world.w_axis.x,
                burst,
                scene.bounds.min.x,
                scene.bounds.max.x
            );
        }
    }

    // Resume the checkpoint and let it settle one frame; its derived
    // state is rebuilt from the authored data alone.
    let bytes = checkpoint.context("the checkpoint frame never ran")?;
    let mut restored = snapshot::decode(&bytes)?;
    restored.update(FRAME_DT, &jobs);
    let restored_pivot = restored
        .transforms
        .get_by_entity(pivot)
        .context("pivot missing from the restored scene")?;
    log::info!(
        "Restored checkpoint: {} transform(s), pivot back at x = {:+.2}.",
        restored.transforms.len(),
        restored_pivot.world.w_axis.x
    );

    Ok(())
}
