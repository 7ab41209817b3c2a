//! Tarjan's strongly connected components over the `before` relation.
//!
//! Components are returned in the order they are completed; vertices are
//! visited in declaration order, so diagnostics are reproducible.

use indexmap::IndexMap;

use super::Vertex;

struct Tarjan<'a> {
    vertices: &'a IndexMap<String, Vertex>,
    counter: usize,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<String>>,
}

/// Returns every strongly connected component, singletons included.
pub(super) fn strongly_connected(vertices: &IndexMap<String, Vertex>) -> Vec<Vec<String>> {
    let n = vertices.len();
    let mut t = Tarjan {
        vertices,
        counter: 0,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        components: Vec::new(),
    };

    for v in 0..n {
        if t.index[v].is_none() {
            t.visit(v);
        }
    }
    t.components
}

impl Tarjan<'_> {
    fn visit(&mut self, v: usize) {
        let vertices = self.vertices;
        self.index[v] = Some(self.counter);
        self.lowlink[v] = self.counter;
        self.counter += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        if let Some((_, vertex)) = vertices.get_index(v) {
            for name in &vertex.before {
                let Some(w) = vertices.get_index_of(name) else {
                    continue;
                };
                match self.index[w] {
                    None => {
                        self.visit(w);
                        self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                    }
                    Some(w_index) if self.on_stack[w] => {
                        self.lowlink[v] = self.lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
            }
        }

        if Some(self.lowlink[v]) == self.index[v] {
            let mut component = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                if let Some((name, _)) = vertices.get_index(w) {
                    component.push(name.clone());
                }
                if w == v {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
