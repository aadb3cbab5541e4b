use haze::distance::{KernelParameters, Rbf};
use haze::fuzzy::{Fcm, FuzzyFit, Kfcms, Mskfcm};
use haze::validity::{partition_coefficient, partition_entropy};
use haze::{FeatureImage, StructuringElement};
use ndarray::Array3;
use rand::prelude::*;
use rand_distr::Normal;
use std::sync::Arc;

const SIZE: usize = 24;
const INTENSITIES: [f64; 3] = [0.0, 100.0, 200.0];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows per-iteration errors.
    env_logger::init();

    // Phantom: background, a shell and an inner sphere, with Gaussian noise.
    let mut rng = StdRng::seed_from_u64(2010);
    let noise = Normal::new(0.0, 35.0)?;
    let centre = (SIZE as f64 - 1.0) / 2.0;
    let mut truth = Vec::with_capacity(SIZE * SIZE * SIZE);
    let mut volume = Array3::<f64>::zeros((SIZE, SIZE, SIZE));
    for ((z, y, x), v) in volume.indexed_iter_mut() {
        let r = ((z as f64 - centre).powi(2) + (y as f64 - centre).powi(2) + (x as f64 - centre).powi(2)).sqrt();
        let class = if r < 5.0 {
            2
        } else if r < 10.0 {
            1
        } else {
            0
        };
        truth.push(class);
        *v = INTENSITIES[class] + rng.sample(noise);
    }
    let image = FeatureImage::from_scalar(volume.view())?;
    let seeds = vec![vec![20.0], vec![90.0], vec![180.0]];
    let kernel = Arc::new(Rbf::new(KernelParameters::new(2.0 * 150.0 * 150.0)));

    let fcm = Fcm::new(3).with_centroids(seeds.clone()).fit(&image)?;
    report("FCM", &fcm, &truth);

    let kfcms = Kfcms::new(3)
        .with_shared_kernel(kernel.clone())
        .with_structuring_element(StructuringElement::cuboid(&[1, 1, 1]))
        .with_alpha(3.0)
        .with_centroids(seeds.clone())
        .fit(&image)?;
    report("KFCMS", &kfcms, &truth);

    let mskfcm = Mskfcm::new(3)
        .with_shared_kernel(kernel)
        .with_structuring_element(StructuringElement::ball(&[1, 1, 1]))
        .with_p(1.0)
        .with_q(2.0)
        .with_centroids(seeds)
        .fit(&image)?;
    report("MSKFCM", &mskfcm, &truth);

    Ok(())
}

fn report(name: &str, fit: &FuzzyFit, truth: &[usize]) {
    let labels = fit.membership.label_vec();
    let wrong = labels.iter().zip(truth).filter(|(l, t)| l != t).count();
    let centroids: Vec<String> = fit.centroids.iter().map(|c| format!("{:.1}", c[0])).collect();
    println!(
        "{name:>7}: iterations={} converged={} centroids=[{}] misclassified={:.2}% pc={:.3} pe={:.3}",
        fit.iterations,
        fit.converged,
        centroids.join(", "),
        100.0 * wrong as f64 / truth.len() as f64,
        partition_coefficient(&fit.membership).unwrap_or(f64::NAN),
        partition_entropy(&fit.membership).unwrap_or(f64::NAN),
    );
}
