// Ladder graph planning for a two-joint arm
//
// The end effector follows a straight line past a pillar. Every waypoint
// offers the elbow-up and elbow-down inverse kinematics solutions; the
// collision edge evaluator connects them and the ladder search picks the
// cheapest collision-free chain.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ladder_planning::arm_navigation::{CircleObstacle, PlanarArm, PlanarWorld};
use ladder_planning::utils::{colors, PathStyle, Visualizer};
use ladder_planning::{
    CollisionEdgeEvaluator, EdgeEvaluatorConfig, LadderGraph, Path2D, Point2D, RoboticsError,
    RoboticsResult, Rung,
};

const N_WAYPOINTS: usize = 20;
const SHOW_ANIMATION: bool = true;

fn waypoints(start: Point2D, goal: Point2D) -> Vec<Point2D> {
    (0..N_WAYPOINTS)
        .map(|i| {
            let t = i as f64 / (N_WAYPOINTS - 1) as f64;
            Point2D::new(start.x + (goal.x - start.x) * t, start.y + (goal.y - start.y) * t)
        })
        .collect()
}

fn main() -> RoboticsResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("ladder planner start");

    let arm = PlanarArm::two_joint(1.0, 0.8)?;
    let world = PlanarWorld::new(arm.clone())
        .with_obstacle(CircleObstacle::new("pillar", Point2D::new(0.6, 0.75), 0.2))
        .with_obstacle(CircleObstacle::new("post", Point2D::new(-0.4, -0.6), 0.15));
    let world = Arc::new(world);

    let targets = waypoints(Point2D::new(1.3, -0.7), Point2D::new(1.3, 0.7));
    let mut rungs = Vec::with_capacity(targets.len());
    for (i, target) in targets.iter().enumerate() {
        let solutions = arm.inverse_kinematics(*target)?;
        if solutions.is_empty() {
            return Err(RoboticsError::PlanningError(format!(
                "waypoint {} ({:.2}, {:.2}) is out of reach",
                i, target.x, target.y
            )));
        }
        rungs.push(Rung::from_configurations(arm.dof(), solutions)?);
    }

    let config = EdgeEvaluatorConfig::default()
        .with_longest_valid_segment_length(0.2)
        .with_allow_collision(true);
    let evaluator = CollisionEdgeEvaluator::from_environment(Arc::clone(&world), config)?;
    let graph = LadderGraph::build(rungs, &evaluator)?;
    let path = graph.shortest_path()?;

    info!(cost = path.cost, rungs = path.indices.len(), "path found");
    if !path.is_collision_free() {
        warn!(fallback_edges = path.fallback_edges, "path uses colliding transitions");
    }

    if SHOW_ANIMATION {
        std::fs::create_dir_all("img/arm_navigation")?;
        let mut vis = Visualizer::new();
        vis.set_title("Ladder Graph Planning").set_workspace(2.0);
        vis.plot_obstacles(world.obstacles());

        let mut tip_path = Path2D::new();
        for joints in &path.configurations {
            let segments = arm.forward_kinematics(joints)?;
            if let Some(last) = segments.last() {
                tip_path.push(last.end);
            }
            vis.plot_arm(&segments, colors::ARM);
        }
        vis.plot_path(&tip_path, &PathStyle::new(colors::PATH, "End effector"));
        vis.plot_point(targets[0], colors::GREEN, "Start");
        vis.plot_point(targets[targets.len() - 1], colors::BLUE, "Goal");

        let output_path = "img/arm_navigation/ladder_planner.png";
        vis.save_png(output_path, 800, 800)?;
        info!(output_path, "plot saved");
    }

    info!("ladder planner finish");
    Ok(())
}
