use transit_od::prelude::*;
use transit_od::*;

use num_traits::Num;
use rand::prelude::*;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

type ABackend = TotsuBackend<FloatGeneric<f64>>;

fn num_by_env<N: Num + std::fmt::Display>(e: &str) -> Option<N>
{
    if let Some(v) = std::env::var(e).ok()
                     .and_then(|s| {N::from_str_radix(&s, 10).ok()}) {
        log::info!("{}: {}", e, v);
        Some(v)
    }
    else {
        None
    }
}

fn set_par_by_env(p: &mut ConvexParam<f64>)
{
    p.max_iter = num_by_env("MAX_ITER").or(p.max_iter);
    p.eps_acc = num_by_env("EPS_ACC").unwrap_or(p.eps_acc);
    p.eps_inf = num_by_env("EPS_INF").unwrap_or(p.eps_inf);
    p.eps_zero = num_by_env("EPS_ZERO").unwrap_or(p.eps_zero);
    p.log_period = num_by_env("LOG_PERIOD").unwrap_or(p.log_period);
}

/// heatmap of an estimate, boarding stops downward
fn plot_heatmap(path: &Path, title: &str, x: &FlowMatrix<f64>) -> Result<()>
{
    let n = x.n();
    let max = x.max_entry().max(1.);

    let root = SVGBackend::new(path, (480, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(
            0..n,
            0..n
        )?;

    chart.configure_mesh()
        .disable_mesh()
        .x_desc("alighting stop")
        .y_desc("boarding stop (reversed)")
        .draw()?;

    chart.draw_series(
        itertools::iproduct!(0.. n, 0.. n).map(|(i, j)| {
            let level = (255. * (1. - x[(i, j)].max(0.) / max)) as u8;
            let y = n - 1 - i;

            Rectangle::new([(j, y), (j + 1, y + 1)], RGBColor(255, level, level).filled())
        })
    )?;

    Ok(())
}

/// main
fn main() -> Result<()> {
    env_logger::init();

    //----- make a ground truth of the line

    let n = num_by_env::<usize>("N_STOPS").unwrap_or(8).max(2);
    let seed: u64 = num_by_env("SEED").unwrap_or(0);
    let max_flow: usize = num_by_env("MAX_FLOW").unwrap_or(20);
    let perturb: f64 = num_by_env("PERTURB").unwrap_or(0.3_f64).max(0.).min(0.99);
    let out_dir = std::env::var("OUT_DIR").unwrap_or_else(|_| ".".to_string());

    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let truth = FlowMatrix::new(n)
                .by_fn(|i, j| if i < j {rng.gen_range(0..=max_flow) as f64} else {0.});
    println!("ground truth:\n{}", truth);

    let marginals = Marginals::from_flow(&truth);
    println!("boarding:  {:?}", marginals.boarding());
    println!("alighting: {:?}", marginals.alighting());

    let mut cmp = Comparison::new(truth.clone());
    let mut estimates = Vec::new();

    //----- IPF from a uniform seed and from a perturbed one

    let ipf = Ipf::new();

    let uniform = FlowMatrix::upper_uniform(n, 1.);
    let perturbed = FlowMatrix::upper_uniform(n, 1.)
                    .by_fn(|i, j| if i < j {rng.gen_range(1. - perturb..=1. + perturb)} else {0.});

    for (label, start) in [("ipf-uniform", &uniform), ("ipf-perturbed", &perturbed)] {
        let rslt = ipf.estimate(&marginals, start);
        if let Ok(r) = &rslt {
            println!("{}: {} iterations, residual {:.3e}", label, r.iterations, r.residual);
        }

        cmp.add(label, rslt.as_ref().map(|r| &r.estimate));
        if let Ok(r) = rslt {
            estimates.push((label.to_string(), r.estimate));
        }
    }

    //----- convex objectives

    let constraints = ConstraintBuilder::new().build(&marginals)?;
    let estimator = ConvexEstimator::new(ABackend::new().par(|p| {
        set_par_by_env(p);
    }));

    for (objective, rslt) in estimator.estimate_all(&constraints) {
        let label = objective.to_string();
        if let Ok(r) = &rslt {
            println!("{}: objective {:.3}, violation {:.3e}", label, r.objective_value, r.violation);
        }

        cmp.add(&label, rslt.as_ref().map(|r| &r.estimate));
        if let Ok(r) = rslt {
            estimates.push((label, r.estimate));
        }
    }

    //----- report

    println!("\n{}", cmp);
    if let Some(best) = cmp.best() {
        println!("best: {}", best.label);
    }

    //----- heatmaps

    let out_dir = Path::new(&out_dir);
    std::fs::create_dir_all(out_dir)?;

    plot_heatmap(&out_dir.join("truth.svg"), "truth", &truth)?;
    for (label, x) in estimates.iter() {
        let path = out_dir.join(format!("{}.svg", label));
        plot_heatmap(&path, label, x)?;
        log::info!("plotted {}", path.display());
    }

    Ok(())
}
