use get_if_addrs::get_if_addrs;
use std::net::UdpSocket;

/// Devine l'adresse IP locale de la machine.
///
/// Crée un socket UDP vers un serveur DNS public (8.8.8.8) et demande au
/// système quelle interface serait utilisée pour l'atteindre. Aucun paquet
/// n'est réellement émis (UDP est sans connexion).
///
/// # Returns
///
/// L'adresse IP locale sous forme de `String`, ou `"127.0.0.1"` si la
/// détection échoue.
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            "127.0.0.1".to_string()
        }
        Err(_) => "127.0.0.1".to_string(),
    }
}

/// Liste les adresses IPv4 non-loopback de la machine.
///
/// L'adresse de sortie principale (celle de [`guess_local_ip`]) est placée en
/// tête de liste, suivie des adresses des autres interfaces, sans doublons.
/// Si aucune interface utilisable n'est trouvée, la liste contient
/// `"127.0.0.1"` pour que les URLs affichées restent cliquables en local.
///
/// # Returns
///
/// Un `Vec<String>` d'adresses IPv4, jamais vide.
pub fn list_lan_ips() -> Vec<String> {
    let mut ips: Vec<String> = Vec::new();

    let primary = guess_local_ip();
    if primary != "127.0.0.1" {
        ips.push(primary);
    }

    if let Ok(interfaces) = get_if_addrs() {
        for iface in interfaces {
            let ip = iface.ip();
            if !ip.is_ipv4() || ip.is_loopback() {
                continue;
            }
            let ip = ip.to_string();
            if !ips.contains(&ip) {
                ips.push(ip);
            }
        }
    }

    if ips.is_empty() {
        ips.push("127.0.0.1".to_string());
    }

    ips
}
