use super::dispatch::{run_event, run_phase};
use super::{FrameOutcome, Game};
use crate::error::GameError;
use crate::event::EventKind;
use crate::hooks::HookPoint;
use crate::motion;
use crate::render::{DrawParams, Renderer};
use crate::runner::ActionRunner;

impl<R: ActionRunner, D: Renderer> Game<R, D> {
    /// Advance the world by one frame.
    ///
    /// Returns `Close` when the renderer asks to close after presenting; the
    /// step phases are skipped in that case. Any failure aborts the rest of
    /// the frame, including the end-of-frame purge.
    pub fn frame(&mut self) -> Result<FrameOutcome, GameError> {
        let result = self.run_phases();
        if let Err(err) = &result {
            log::warn!("Frame {} aborted: {err}", self.frame_count);
        }
        result
    }

    fn run_phases(&mut self) -> Result<FrameOutcome, GameError> {
        self.draw_phase()?;
        self.renderer.render_frame();
        if self.renderer.should_close() {
            log::info!("Renderer requested close after frame {}", self.frame_count);
            return Ok(FrameOutcome::Close);
        }

        self.run_hooks(HookPoint::BEFORE_BEGIN_STEP)?;
        run_phase(
            &mut self.runner,
            &self.assets,
            &mut self.world,
            EventKind::StepBegin,
        )?;

        self.run_hooks(HookPoint::BEFORE_STEP)?;
        run_phase(
            &mut self.runner,
            &self.assets,
            &mut self.world,
            EventKind::Step,
        )?;

        for instance in self.world.instances.iter_mut() {
            if instance.exists {
                motion::integrate(instance);
            }
        }

        self.run_hooks(HookPoint::BEFORE_END_STEP)?;
        run_phase(
            &mut self.runner,
            &self.assets,
            &mut self.world,
            EventKind::StepEnd,
        )?;

        self.world.instances.clear_deleted();
        self.frame_count += 1;
        Ok(FrameOutcome::Continue)
    }

    /// Draw every live, visible instance in table order: its draw event when
    /// the object defines one, otherwise its current sprite frame.
    fn draw_phase(&mut self) -> Result<(), GameError> {
        let mut index = 0;
        while index < self.world.instances.count() {
            let instance = &self.world.instances[index];
            index += 1;
            if !(instance.exists && instance.visible) {
                continue;
            }

            let object = self
                .assets
                .object(instance.object_index)
                .ok_or(GameError::MissingObject(instance.object_index))?;
            if object.ev_draw.is_some() {
                let (target, object_index) = (instance.id, instance.object_index);
                run_event(
                    &mut self.runner,
                    &self.assets,
                    &mut self.world,
                    target,
                    object_index,
                    EventKind::Draw,
                )?;
                continue;
            }

            if instance.sprite_index < 0 {
                continue;
            }
            let sprite = self
                .assets
                .sprite(instance.sprite_index as usize)
                .ok_or(GameError::MissingSprite(instance.sprite_index))?;
            if sprite.frames.is_empty() {
                return Err(GameError::EmptySprite(instance.sprite_index));
            }
            let frame = (instance.image_index as i64).rem_euclid(sprite.frames.len() as i64);
            log::trace!(
                "Drawing instance {} with sprite {} frame {frame}",
                instance.id,
                instance.sprite_index
            );
            self.renderer.draw_image(
                &sprite.frames[frame as usize],
                &DrawParams::from_instance(instance),
            );
        }
        Ok(())
    }

    fn run_hooks(&mut self, points: &[HookPoint]) -> Result<(), GameError> {
        for &point in points {
            self.hooks
                .run(point, &mut self.world.instances, &self.world.globals)
                .map_err(|message| GameError::Hook { point, message })?;
        }
        Ok(())
    }
}
