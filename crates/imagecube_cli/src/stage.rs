//! In-memory stage the runner rotates

use imagecube::ImageCube;
use imagecube_surface::{Style, StyleSystem, SurfaceId, SurfaceTree};
use serde::Serialize;

/// Panel backgrounds, cycled when there are more panels than colours
const PALETTE: [&str; 6] = ["#336699", "#993333", "#339966", "#996633", "#663399", "#339999"];

pub struct Stage {
    pub tree: SurfaceTree,
    pub container: SurfaceId,
    pub panels: Vec<SurfaceId>,
    /// Milliseconds replayed so far
    pub clock_ms: f32,
}

impl Stage {
    /// A positioned container holding `panels` padded, bordered panels
    pub fn build(panels: usize, width: f32, height: f32) -> anyhow::Result<Self> {
        let mut tree = SurfaceTree::new();
        let container = tree.insert(Style::parse(&format!(
            "position: absolute; left: 0px; top: 0px; width: {width}px; height: {height}px"
        )));
        tree.set_label(container, "container");

        let mut ids = Vec::with_capacity(panels);
        for i in 0..panels {
            let style = Style::parse(&format!(
                "padding-left: 4px; padding-right: 4px; padding-top: 4px; padding-bottom: 4px; \
                 border-left-width: thin; border-right-width: thin; border-top-width: thin; \
                 border-bottom-width: thin; background-color: {}",
                PALETTE[i % PALETTE.len()]
            ));
            let panel = tree.insert_child(container, style)?;
            tree.set_label(panel, format!("panel-{i}"));
            ids.push(panel);
        }

        Ok(Self {
            tree,
            container,
            panels: ids,
            clock_ms: 0.0,
        })
    }

    pub fn panel(&self, index: usize) -> Option<SurfaceId> {
        self.panels.get(index).copied()
    }

    fn name(&self, id: SurfaceId) -> String {
        match self.tree.label(id) {
            Some(label) => label.to_string(),
            None => format!("{id:?}"),
        }
    }

    /// Everything a reader needs to check one frame
    pub fn report(&self, cube: &ImageCube) -> FrameReport {
        let surfaces = self
            .tree
            .children(self.container)
            .into_iter()
            .filter_map(|id| {
                let snapshot = self.tree.snapshot(id)?;
                Some(SurfaceLine {
                    name: self.name(id),
                    visible: snapshot.visible,
                    classes: snapshot.classes,
                    style: snapshot.style.to_string(),
                })
            })
            .collect();

        FrameReport {
            time_ms: self.clock_ms,
            phase: cube.phase(self.container).map(|p| format!("{p:?}")),
            current: cube.current(self.container).map(|id| self.name(id)),
            next: cube.next(self.container).map(|id| self.name(id)),
            surfaces,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub time_ms: f32,
    pub phase: Option<String>,
    pub current: Option<String>,
    pub next: Option<String>,
    pub surfaces: Vec<SurfaceLine>,
}

#[derive(Debug, Serialize)]
pub struct SurfaceLine {
    pub name: String,
    pub visible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    pub style: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecube::SettingsPatch;

    #[test]
    fn report_names_panels_and_strips() {
        let mut stage = Stage::build(2, 200.0, 100.0).unwrap();
        let mut cube = ImageCube::with_seed(1);
        cube.attach(
            &mut stage.tree,
            stage.container,
            SettingsPatch::new().full_3d(true).segments(2).repeat(false),
        );
        cube.rotate(&mut stage.tree, stage.container, None);

        let report = stage.report(&cube);
        assert_eq!(report.current.as_deref(), Some("panel-0"));
        assert_eq!(report.next.as_deref(), Some("panel-1"));
        assert_eq!(report.phase.as_deref(), Some("Animating"));
        assert_eq!(report.surfaces[0].name, "panel-0");
        assert!(report.surfaces.len() > 2);
        assert!(report.surfaces[2..].iter().all(|s| !s.classes.is_empty()));
    }
}
