use std::path::Path;

use crate::{
    animate,
    core::{Fps, FrameIndex},
    encode_ffmpeg::{EncodeConfig, FfmpegEncoder},
    error::{QuizError, QuizResult},
    model::Quiz,
    render::{Canvas, FrameRgba, Palette, draw_frame},
    timeline::Timeline,
};

#[derive(Clone, Debug)]
pub struct RenderOpts {
    pub canvas: Canvas,
    pub fps: Fps,
    pub overwrite: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::vertical_1080(),
            fps: Fps::default(),
            overwrite: true,
        }
    }
}

/// Renders one absolute frame of the quiz. Used by the single-frame debug
/// path and, frame by frame, by the MP4 render below — both go through the
/// same `sample` + `draw_frame`, which is what keeps them in lockstep.
pub fn render_frame(
    quiz: &Quiz,
    timeline: &Timeline,
    frame: FrameIndex,
    canvas: Canvas,
) -> QuizResult<FrameRgba> {
    let state = animate::sample(timeline, frame)
        .ok_or_else(|| QuizError::invalid_input(format!("frame {} is out of bounds", frame.0)))?;
    let palette = Palette::from_style(&quiz.style)?;
    Ok(draw_frame(
        &state,
        &quiz.questions[state.question_index],
        &palette,
        canvas,
    ))
}

/// Full offline render: compile the timeline, walk every frame through the
/// animator, pipe the composited frames into ffmpeg.
#[tracing::instrument(skip(quiz), fields(questions = quiz.questions.len()))]
pub fn render_quiz_to_mp4(quiz: &Quiz, opts: &RenderOpts, out_path: &Path) -> QuizResult<()> {
    quiz.validate()?;

    let timeline = Timeline::compile(&quiz.questions, opts.fps);
    let total = timeline.total_frames();
    if total == 0 {
        return Err(QuizError::invalid_input("quiz has zero total duration"));
    }
    tracing::info!(
        total_frames = total,
        total_secs = quiz.total_duration_secs(),
        "starting render"
    );

    let palette = Palette::from_style(&quiz.style)?;
    let mut encoder = FfmpegEncoder::new(EncodeConfig {
        width: opts.canvas.width,
        height: opts.canvas.height,
        fps: opts.fps,
        out_path: out_path.to_path_buf(),
        overwrite: opts.overwrite,
    })?;

    for f in 0..total {
        // Every frame is inside the timeline by construction.
        let state = animate::sample(&timeline, FrameIndex(f))
            .ok_or_else(|| QuizError::render(format!("frame {f} fell outside the timeline")))?;
        let frame = draw_frame(
            &state,
            &quiz.questions[state.question_index],
            &palette,
            opts.canvas,
        );
        encoder.encode_frame(&frame)?;
    }

    encoder.finish()?;
    tracing::info!(out = %out_path.display(), "render finished");
    Ok(())
}
