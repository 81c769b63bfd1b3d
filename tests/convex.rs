use float_eq::assert_float_eq;
use transit_od::prelude::*;
use transit_od::*;

type La = FloatGeneric<f64>;

type ABackend = TotsuBackend<La>;

fn ground_truth() -> FlowMatrix<f64>
{
    FlowMatrix::from_rows(&[
        [0., 10., 5., 3., 2.],
        [0., 0., 8., 4., 6.],
        [0., 0., 0., 7., 3.],
        [0., 0., 0., 0., 9.],
        [0., 0., 0., 0., 0.],
    ]).unwrap()
}

fn assert_close(x: &[f64], y: &[f64], tol: f64)
{
    assert_eq!(x.len(), y.len());
    for (&a, &b) in x.iter().zip(y) {
        assert_float_eq!(a, b, abs <= tol);
    }
}

//

#[test]
fn test_convex_unique_point()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // the feasible region is a single point
    let marginals = Marginals::new(vec![5., 3., 0.], vec![0., 4., 4.]).unwrap();
    let cons = ConstraintBuilder::new().build(&marginals).unwrap();
    let estimator = ConvexEstimator::new(ABackend::new());

    for objective in ObjectiveKind::ALL {
        let rslt = estimator.estimate(&cons, objective).unwrap();
        println!("{}\n{}", objective, rslt.estimate);

        assert_eq!(rslt.objective, objective);
        assert_float_eq!(rslt.estimate.as_slice()[..], [
            0., 4., 1.,
            0., 0., 3.,
            0., 0., 0.,
        ].as_ref(), abs_all <= 1e-3);
    }
}

//

#[test]
fn test_convex_five_stops()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let truth = ground_truth();
    let marginals = Marginals::from_flow(&truth);
    let cons = ConstraintBuilder::new().build(&marginals).unwrap();
    let estimator = ConvexEstimator::new(ABackend::new());

    for (objective, rslt) in estimator.estimate_all(&cons) {
        let rslt = rslt.unwrap();
        println!("{}\n{}", objective, rslt.estimate);

        // marginal fidelity
        assert_close(&rslt.estimate.row_sums(), marginals.boarding(), 1e-3);
        assert_close(&rslt.estimate.col_sums(), marginals.alighting(), 1e-3);
        assert!(rslt.violation < 1e-3);

        // structural validity and nonnegativity
        assert!(rslt.estimate.is_structurally_valid(0.));
        assert!(rslt.estimate.min_entry() >= -1e-9);

        assert_float_eq!(rslt.objective_value, objective.evaluate(&rslt.estimate), abs <= 1e-12);
    }
}

//

#[test]
fn test_convex_l2_error()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let truth = ground_truth();
    let cons = ConstraintBuilder::new().build(&Marginals::from_flow(&truth)).unwrap();
    let estimator = ConvexEstimator::new(ABackend::new());

    let rslt = estimator.estimate(&cons, ObjectiveKind::MinL2).unwrap();
    let err = relative_error(&truth, &rslt.estimate).unwrap();
    println!("{}", err);

    assert!(err < 0.2);
}

//

#[test]
fn test_convex_entropy_error()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let truth = ground_truth();
    let cons = ConstraintBuilder::new().build(&Marginals::from_flow(&truth)).unwrap();
    let estimator = ConvexEstimator::new(ABackend::new());

    let rslt = estimator.estimate(&cons, ObjectiveKind::MaxEntropy).unwrap();
    let err = relative_error(&truth, &rslt.estimate).unwrap();
    println!("{}", err);

    assert!(err < 0.25);
}

//

#[test]
fn test_convex_infeasible()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let marginals = Marginals::new(vec![0., 5., 3.], vec![0., 4., 4.]).unwrap();
    let cons = ConstraintBuilder::new().par(|p| {
        p.check_load = false;
    }).build(&marginals).unwrap();

    let estimator = ConvexEstimator::new(ABackend::new().par(|p| {
        p.max_iter = Some(20_000);
    }));
    let rslt = estimator.estimate(&cons, ObjectiveKind::MinL1).unwrap_err();
    println!("{}", rslt);

    match rslt {
        EstimationError::EstimationFailure {objective, status} => {
            assert_eq!(objective, ObjectiveKind::MinL1);
            assert_ne!(status, SolveStatus::Optimal);
        },
        e => panic!("unexpected {:?}", e),
    }
}

//

struct MockBackend
{
    status: SolveStatus,
    matrix: Option<FlowMatrix<f64>>,
}

impl ConvexBackend<f64> for MockBackend
{
    fn solve(&self, program: &ConvexProgram<'_, f64>) -> (SolveStatus, Option<Solution<f64>>)
    {
        let sol = self.matrix.clone().map(|matrix| {
            let objective_value = program.objective.evaluate(&matrix);
            Solution {matrix, objective_value}
        });

        (self.status, sol)
    }
}

#[test]
fn test_convex_status_mapping()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let marginals = Marginals::new(vec![5., 3., 0.], vec![0., 4., 4.]).unwrap();
    let cons = ConstraintBuilder::new().build(&marginals).unwrap();
    let point = FlowMatrix::from_rows(&[
        [0., 4., 1.],
        [0., 0., 3.],
        [0., 0., 0.],
    ]).unwrap();

    for status in [SolveStatus::Infeasible, SolveStatus::Unbounded, SolveStatus::Error] {
        // a non-optimal solution is never returned
        let estimator = ConvexEstimator::new(MockBackend {status, matrix: Some(point.clone())});
        let rslt = estimator.estimate(&cons, ObjectiveKind::MinLInf).unwrap_err();

        assert_eq!(rslt, EstimationError::EstimationFailure {objective: ObjectiveKind::MinLInf, status});
    }

    let estimator = ConvexEstimator::new(MockBackend {status: SolveStatus::Optimal, matrix: None});
    let rslt = estimator.estimate(&cons, ObjectiveKind::MinL1).unwrap_err();

    assert_eq!(rslt, EstimationError::EstimationFailure {objective: ObjectiveKind::MinL1, status: SolveStatus::Error});

    let estimator = ConvexEstimator::new(MockBackend {status: SolveStatus::Optimal, matrix: Some(FlowMatrix::new(4))});
    let rslt = estimator.estimate(&cons, ObjectiveKind::MinL1).unwrap_err();

    assert_eq!(rslt, EstimationError::EstimationFailure {objective: ObjectiveKind::MinL1, status: SolveStatus::Error});
}

#[test]
fn test_convex_round_off()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let marginals = Marginals::new(vec![5., 3., 0.], vec![0., 4., 4.]).unwrap();
    let cons = ConstraintBuilder::new().build(&marginals).unwrap();
    let noisy = FlowMatrix::from_rows(&[
        [1e-7, 4., 1.],
        [-1e-7, 0., 3.],
        [0., 2e-8, -1e-9],
    ]).unwrap();

    let estimator = ConvexEstimator::new(MockBackend {status: SolveStatus::Optimal, matrix: Some(noisy)});
    let rslt = estimator.estimate(&cons, ObjectiveKind::MinL2).unwrap();

    assert!(rslt.estimate.is_structurally_valid(0.));
    assert_eq!(rslt.violation, 0.);
    assert_eq!(rslt.estimate.min_entry(), 0.);
}

//

#[test]
fn test_convex_thirty_stops()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 30;
    let truth = FlowMatrix::new(n)
                .by_fn(|i, j| if i < j {((i * 7 + j * 3) % 11) as f64} else {0.});
    let marginals = Marginals::from_flow(&truth);
    let cons = ConstraintBuilder::new().build(&marginals).unwrap();
    let estimator = ConvexEstimator::new(ABackend::new());

    let start = std::time::Instant::now();
    let rslt = estimator.estimate(&cons, ObjectiveKind::MinL2).unwrap();
    let elapsed = start.elapsed();
    println!("{} stops: {:?}", n, elapsed);

    assert!(elapsed.as_secs() < 120);

    assert_close(&rslt.estimate.row_sums(), marginals.boarding(), 1e-3);
    assert_close(&rslt.estimate.col_sums(), marginals.alighting(), 1e-3);
    assert!(rslt.estimate.is_structurally_valid(0.));
    assert!(rslt.estimate.min_entry() >= 0.);
}
