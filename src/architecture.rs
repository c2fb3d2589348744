//! The credit application platform, drawn as clusters of services.

use crate::graph_ast::*;

pub const TITLE: &str = "Credit Application Platform - System Function Module Diagram";

pub fn build_graph() -> Graph {
    let mut graph = Graph::new("G");
    graph.comment = Some("Credit Management System Architecture".to_string());
    graph.direction = Direction::TopBottom;
    graph.title = Some(TITLE.to_string());
    graph.title_loc = LabelLoc::Top;
    graph.font.title_size = 20;
    graph.default_shape = Some(NodeShape::Box);
    graph.default_style = vec![StyleFlag::Rounded];

    graph.clusters.push(
        Cluster::new("cluster_frontend", "Frontend")
            .filled("lightgrey")
            .node(
                Node::new(
                    "frontend",
                    "Frontend Application (React + Vite)\n(UI & User Interaction)",
                )
                .shape(NodeShape::House)
                .filled("lightblue"),
            ),
    );

    graph.nodes.push(
        Node::new(
            "gateway",
            "API Gateway\n- Request routing\n- Unified authentication",
        )
        .shape(NodeShape::Mdiamond)
        .filled("palegreen"),
    );

    graph.clusters.push(
        Cluster::new("cluster_backend", "Backend Microservices")
            .filled("lightyellow")
            .node(service(
                "auth_service",
                "Auth Service\n- Login / token validation\n- Permission management",
            ))
            .node(service(
                "user_service",
                "User Service\n- User / student / teacher management\n- Profile upkeep / search",
            ))
            .node(service(
                "activity_service",
                "Credit Activity Service\n- Activity / application / participant management\n- Attachments / statistics",
            )),
    );

    graph.clusters.push(
        Cluster::new("cluster_db", "Data Persistence")
            .filled("azure")
            .node(
                Node::new("db", "PostgreSQL Database")
                    .shape(NodeShape::Cylinder)
                    .filled("beige"),
            ),
    );

    graph.edges = vec![
        Edge::labeled("frontend", "gateway", "HTTP/S request"),
        Edge::labeled("gateway", "auth_service", "Authentication / authorization"),
        Edge::labeled("gateway", "user_service", "User / student / teacher management"),
        Edge::labeled(
            "gateway",
            "activity_service",
            "Activity / application / attachment requests",
        ),
        Edge::labeled("auth_service", "db", "Read/write user credentials"),
        Edge::labeled("user_service", "db", "Read/write user / student / teacher data"),
        Edge::labeled(
            "activity_service",
            "db",
            "Read/write activity / application / participant data",
        ),
    ];

    graph
}

fn service(id: &str, label: &str) -> Node {
    Node::new(id, label)
        .shape(NodeShape::Component)
        .filled("lightpink")
}
