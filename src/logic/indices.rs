use crate::datasources::ImageryProvider;
use crate::error::{CropLensError, Result};
use crate::models::{BandSample, Coordinates, DateWindow, SceneCandidate, VegetationSample};
use chrono::NaiveDate;

/// Normalized difference of NIR and red
pub fn ndvi(nir: f64, red: f64) -> f64 {
    (nir - red) / (nir + red)
}

/// Enhanced vegetation index with blue-band aerosol correction
pub fn evi(nir: f64, red: f64, blue: f64) -> f64 {
    2.5 * (nir - red) / (nir + 6.0 * red - 7.5 * blue + 1.0)
}

/// Least cloudy scene. Ties go to the most recent acquisition, then the
/// smallest scene id, so the choice never depends on provider ordering.
pub fn select_best_image(candidates: &[SceneCandidate]) -> Option<&SceneCandidate> {
    candidates.iter().min_by(|a, b| {
        a.cloud_cover_percent
            .total_cmp(&b.cloud_cover_percent)
            .then_with(|| b.acquired.cmp(&a.acquired))
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Mean over pixels, skipping pixels where the index is undefined
fn masked_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Spatial means of NDVI and EVI over the sampled neighborhood
pub fn reduce_indices(sample: &BandSample) -> Result<(f64, f64)> {
    let pixels = || {
        sample
            .nir
            .iter()
            .zip(&sample.red)
            .zip(&sample.blue)
            .map(|((n, r), b)| (*n, *r, *b))
    };

    let ndvi_mean = masked_mean(pixels().map(|(n, r, _)| ndvi(n, r)));
    let evi_mean = masked_mean(pixels().map(|(n, r, b)| evi(n, r, b)));

    match (ndvi_mean, evi_mean) {
        (Some(ndvi), Some(evi)) => Ok((ndvi, evi)),
        _ => Err(CropLensError::ImageryQuery(format!(
            "no valid pixels among {} sampled",
            sample.nir.len()
        ))),
    }
}

/// NDVI and EVI at `point` from the clearest scene in the trailing window
pub async fn compute_indices(
    provider: &dyn ImageryProvider,
    point: Coordinates,
    as_of: NaiveDate,
    window_days: u32,
    scale_m: f64,
) -> Result<VegetationSample> {
    let window = DateWindow::trailing(as_of, window_days)?;
    let mut candidates = provider.search_scenes(point, window).await?;
    let returned = candidates.len();
    candidates.retain(|c| window.contains(c.acquired));
    if candidates.len() < returned {
        tracing::warn!(
            dropped = returned - candidates.len(),
            "Provider returned scenes outside the search window"
        );
    }

    let scene = select_best_image(&candidates).ok_or(CropLensError::NoImagery {
        start: window.start,
        end: window.end,
    })?;
    tracing::info!(
        scene = %scene.id,
        acquired = %scene.acquired,
        cloud_cover = scene.cloud_cover_percent,
        candidates = candidates.len(),
        "Selected scene"
    );

    let sample = provider.sample_bands(scene, point, scale_m).await?;
    let (ndvi, evi) = reduce_indices(&sample)?;

    Ok(VegetationSample {
        ndvi,
        evi,
        location: point,
        scene_id: scene.id.clone(),
        acquired: scene.acquired,
        window,
    })
}
