use super::graph::{CodeGraph, EntityType, RelationType, SnapshotEdge, SnapshotNode};

const PROJECTS: [&str; 2] = ["core", "web"];
const DIRECTORIES_PER_PROJECT: usize = 2;
const FILES_PER_DIRECTORY: usize = 3;
const CLASSES_PER_FILE: usize = 2;
const FUNCTIONS_PER_FILE: usize = 5;
const ISOLATED_FUNCTIONS: usize = 6;
const DOCUMENTS: usize = 8;

fn pseudo_random(seed: usize) -> f64 {
    let x = ((seed + 1) * 9301 + 49297) % 233280;
    (x as f64) / 233280.0
}

fn record(
    id: String,
    name: String,
    kind: EntityType,
    project: &str,
    file_path: Option<String>,
) -> SnapshotNode {
    let qualified_name = match kind {
        EntityType::Function | EntityType::Class => Some(format!("{project}::{name}")),
        _ => None,
    };
    let signature = (kind == EntityType::Function)
        .then(|| format!("fn {name}(ctx: &Context) -> Result<()>"));

    SnapshotNode {
        id,
        name,
        kind,
        file_path,
        qualified_name,
        signature,
        docstring: None,
        project: Some(project.to_owned()),
        degree: None,
    }
}

fn link(source: &str, target: &str, relation: RelationType) -> SnapshotEdge {
    SnapshotEdge {
        source: source.to_owned(),
        target: target.to_owned(),
        relation,
    }
}

/// Deterministic synthetic code graph used when no export file is given.
pub fn demo_graph() -> CodeGraph {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut functions: Vec<String> = Vec::new();
    let mut classes: Vec<String> = Vec::new();

    for project in PROJECTS {
        for dir in 0..DIRECTORIES_PER_PROJECT {
            let dir_id = format!("{project}/dir{dir}");
            nodes.push(record(
                dir_id.clone(),
                format!("{project}/src/module_{dir}"),
                EntityType::Directory,
                project,
                Some(format!("{project}/src/module_{dir}")),
            ));

            for file in 0..FILES_PER_DIRECTORY {
                let path = format!("{project}/src/module_{dir}/part_{file}.rs");
                let file_id = format!("{dir_id}/file{file}");
                nodes.push(record(
                    file_id.clone(),
                    format!("part_{file}.rs"),
                    EntityType::File,
                    project,
                    Some(path.clone()),
                ));
                edges.push(link(&dir_id, &file_id, RelationType::Contains));

                for class in 0..CLASSES_PER_FILE {
                    let class_id = format!("{file_id}/class{class}");
                    nodes.push(record(
                        class_id.clone(),
                        format!("{}Handler{dir}{file}{class}", project_prefix(project)),
                        EntityType::Class,
                        project,
                        Some(path.clone()),
                    ));
                    edges.push(link(&file_id, &class_id, RelationType::Contains));
                    classes.push(class_id);
                }

                for function in 0..FUNCTIONS_PER_FILE {
                    let function_id = format!("{file_id}/fn{function}");
                    nodes.push(record(
                        function_id.clone(),
                        format!("handle_{project}_{dir}_{file}_{function}"),
                        EntityType::Function,
                        project,
                        Some(path.clone()),
                    ));
                    let owner = if function < CLASSES_PER_FILE {
                        format!("{file_id}/class{function}")
                    } else {
                        file_id.clone()
                    };
                    edges.push(link(&owner, &function_id, RelationType::Defines));
                    functions.push(function_id);
                }
            }
        }
    }

    for (index, source) in functions.iter().enumerate() {
        let fan_out = 1 + (pseudo_random(index) * 3.0) as usize;
        for step in 0..fan_out {
            let target = (pseudo_random(index * 7 + step) * functions.len() as f64) as usize;
            if let Some(target) = functions.get(target) {
                edges.push(link(source, target, RelationType::Calls));
            }
        }
    }

    // Call cycles: mutual recursion plus one self call.
    if functions.len() > 2 {
        edges.push(link(&functions[0], &functions[1], RelationType::Calls));
        edges.push(link(&functions[1], &functions[0], RelationType::Calls));
        edges.push(link(&functions[2], &functions[2], RelationType::Calls));
    }

    for (index, class) in classes.iter().enumerate().skip(1) {
        if index % 3 == 0 {
            edges.push(link(class, &classes[index / 3], RelationType::Extends));
        } else if index % 5 == 0 {
            edges.push(link(class, &classes[0], RelationType::Implements));
        }
    }

    for doc in 0..DOCUMENTS {
        let project = PROJECTS[doc % PROJECTS.len()];
        let doc_id = format!("{project}/docs/guide{doc}");
        nodes.push(record(
            doc_id.clone(),
            format!("guide_{doc}.md"),
            EntityType::Document,
            project,
            Some(format!("{project}/docs/guide_{doc}.md")),
        ));
        if doc + 1 < DOCUMENTS {
            let class = (pseudo_random(doc * 13) * classes.len() as f64) as usize;
            let function = (pseudo_random(doc * 17) * functions.len() as f64) as usize;
            if let Some(class) = classes.get(class) {
                edges.push(link(&doc_id, class, RelationType::Documents));
            }
            if let Some(function) = functions.get(function) {
                edges.push(link(&doc_id, function, RelationType::Documents));
            }
        }
    }

    for index in 0..ISOLATED_FUNCTIONS {
        let project = PROJECTS[index % PROJECTS.len()];
        nodes.push(record(
            format!("{project}/orphan{index}"),
            format!("unused_helper_{index}"),
            EntityType::Function,
            project,
            None,
        ));
    }

    CodeGraph::from_records(nodes, edges).0
}

fn project_prefix(project: &str) -> &'static str {
    match project {
        "core" => "Core",
        _ => "Web",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_graph_is_deterministic_and_covers_every_entity_type() {
        let first = demo_graph();
        let second = demo_graph();
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());

        for kind in EntityType::ALL {
            assert!(
                !first.sample(kind, 500, None).nodes.is_empty(),
                "missing {kind:?} nodes"
            );
        }
        assert_eq!(first.projects(), vec!["core".to_owned(), "web".to_owned()]);
    }
}
